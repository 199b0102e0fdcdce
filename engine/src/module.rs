use crate::classifier::Verdict;
use crate::error::{EngineError, ModuleError};
use crate::target::Target;

/// Where modules report candidate outputs. Implemented by `Session`;
/// split out as a trait so module code never sees the run record or the
/// store internals.
pub trait OutputSink {
    /// Classifies `bytes` and, when they look worth keeping, persists
    /// them. Returns the verdict so callers can react to it.
    fn test_output(&self, bytes: &[u8]) -> Result<Verdict, EngineError>;
}

/// One analysis capability. Implementations read the target, extract
/// candidate byte sequences, and report each through the sink; they must
/// never write result files themselves and never modify the target.
pub trait Module {
    /// Short stable identifier, used in logs and the run record.
    fn name(&self) -> &'static str;

    /// Human-readable summary of what the module does.
    fn description(&self) -> &'static str;

    /// Runs the analysis. A `ModuleError` means this module failed and
    /// the rest of the session should continue; a sink error bubbled up
    /// through `ModuleError::Fatal` aborts the whole run.
    fn run(&self, target: &Target, sink: &dyn OutputSink) -> Result<(), ModuleError>;
}
