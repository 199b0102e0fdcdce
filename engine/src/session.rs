use std::any::Any;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::classifier::{Verdict, classify};
use crate::config::ScanConfig;
use crate::error::{ConfigError, EngineError, ModuleError};
use crate::module::{Module, OutputSink};
use crate::store::ResultStore;
use crate::target::Target;

/// Outcome of one module invocation, appended in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleOutcome {
    pub name: String,
    pub description: String,
    /// Whether `run()` returned Ok. A module that started but failed (or
    /// aborted the session) stays in the record with `completed: false`.
    pub completed: bool,
    /// Findings persisted while this module ran.
    pub findings: u64,
}

pub type RunRecord = Vec<ModuleOutcome>;

/// Owns the validated target, the result store and the run record, and
/// exposes the two operations everything else is built on: `run` over an
/// ordered module list and `test_output` for candidate triage.
#[derive(Debug)]
pub struct Session {
    target: Target,
    store: ResultStore,
    config: ScanConfig,
    record: RunRecord,
    findings: AtomicU64,
}

impl Session {
    /// Validates both paths up front: the input must exist and be
    /// readable, the output path must be (or become) a directory. All
    /// later operations treat both as immutable.
    pub fn new<P, Q>(input: P, out_dir: Q, config: ScanConfig) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let target = Target::open(input)?;
        let store = ResultStore::create(out_dir)?;
        Ok(Self {
            target,
            store,
            config,
            record: Vec::new(),
            findings: AtomicU64::new(0),
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn results_directory(&self) -> &Path {
        self.store.directory()
    }

    /// Ordered record of the modules that started, populated by `run`.
    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    /// Total findings persisted so far.
    pub fn findings(&self) -> u64 {
        self.findings.load(Ordering::SeqCst)
    }

    /// Runs every module in order. A module-level failure is logged and
    /// the run continues; a sink failure (storage, classification
    /// contract) aborts immediately, leaving the record at the modules
    /// that started.
    pub fn run(&mut self, modules: Vec<Box<dyn Module>>) -> Result<(), EngineError> {
        for module in modules {
            log::info!("Running module: {}", module.name());
            log::info!("{}", module.description());
            self.record.push(ModuleOutcome {
                name: module.name().to_string(),
                description: module.description().to_string(),
                completed: false,
                findings: 0,
            });

            let before = self.findings();
            let result = module.run(&self.target, &*self);
            let after = self.findings();

            if let Some(outcome) = self.record.last_mut() {
                outcome.findings = after - before;
                outcome.completed = result.is_ok();
            }

            match result {
                Ok(()) => log::info!("Module {} finished", module.name()),
                Err(ModuleError::Fatal(err)) => return Err(err),
                Err(err) => log::warn!("Module {} failed: {err}", module.name()),
            }
        }
        Ok(())
    }

    /// Triage for one candidate output: classify, and persist when the
    /// verdict says the bytes are worth keeping.
    pub fn test_output(&self, bytes: &[u8]) -> Result<Verdict, EngineError> {
        let verdict = classify(bytes);
        if let Verdict::Interesting { label } = &verdict {
            let path = self.store.persist(bytes)?;
            self.findings.fetch_add(1, Ordering::SeqCst);
            log::info!("Found something worth keeping: {label}");
            log::info!("Saved to {}", path.display());
        } else {
            log::debug!("Discarding generic output ({} bytes)", bytes.len());
        }
        Ok(verdict)
    }

    /// Loosely-typed entry point for out-of-tree module payloads. Accepts
    /// byte-sequence-shaped values; anything else fails, naming the
    /// offending type, and writes nothing.
    pub fn test_output_any<T: Any>(&self, value: &T) -> Result<Verdict, EngineError> {
        let any = value as &dyn Any;
        if let Some(bytes) = any.downcast_ref::<Vec<u8>>() {
            return self.test_output(bytes);
        }
        if let Some(bytes) = any.downcast_ref::<&[u8]>() {
            return self.test_output(bytes);
        }
        if let Some(text) = any.downcast_ref::<String>() {
            return self.test_output(text.as_bytes());
        }
        Err(EngineError::Classification {
            type_name: std::any::type_name::<T>(),
        })
    }
}

impl OutputSink for Session {
    fn test_output(&self, bytes: &[u8]) -> Result<Verdict, EngineError> {
        Session::test_output(self, bytes)
    }
}
