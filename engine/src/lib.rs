pub mod classifier;
pub mod config;
pub mod error;
pub mod module;
pub mod session;
pub mod store;
pub mod target;

// Re-export key types
pub use classifier::{Verdict, classify};
pub use config::ScanConfig;
pub use error::{ConfigError, EngineError, ModuleError};
pub use module::{Module, OutputSink};
pub use session::{ModuleOutcome, RunRecord, Session};
pub use store::ResultStore;
pub use target::Target;
