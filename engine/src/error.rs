use std::path::PathBuf;
use thiserror::Error;

/// Preflight failures. These are raised before any module runs and map to
/// exit code 1 in the CLI.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot find file \"{0}\"")]
    MissingInput(PathBuf),

    #[error("cannot read file \"{path}\": {source}")]
    UnreadableInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("output path exists and is not a directory: {0}")]
    OutputNotADirectory(PathBuf),

    #[error("cannot create results directory \"{path}\": {source}")]
    OutputUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A single module's analysis failed. The runner logs it and moves on to
/// the next module, except for `Fatal` which it re-raises.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("metadata parsing error: {0}")]
    Metadata(String),

    #[error("{0}")]
    Analysis(String),

    /// Engine-level failure surfaced through the sink. Not isolated: the
    /// runner unwraps it and aborts the session.
    #[error(transparent)]
    Fatal(#[from] EngineError),
}

/// Failures of the triage pipeline itself. Always fatal to the run:
/// silently dropping a finding would defeat the tool's purpose.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("test_output got unexpected payload type {type_name}")]
    Classification { type_name: &'static str },

    #[error("results directory is not writable: {source}")]
    Storage {
        #[source]
        source: std::io::Error,
    },
}
