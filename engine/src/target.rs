use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{ConfigError, ModuleError};

/// The input artifact under analysis. Path and bytes are fixed at
/// construction; modules only ever get read access.
#[derive(Debug)]
pub struct Target {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl Target {
    /// Resolves and reads the input file. Missing or unreadable paths fail
    /// here, before any module is constructed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let full = fs::canonicalize(path.as_ref())
            .map_err(|_| ConfigError::MissingInput(path.as_ref().to_path_buf()))?;
        let bytes = fs::read(&full).map_err(|source| ConfigError::UnreadableInput {
            path: full.clone(),
            source,
        })?;
        log::info!("Analyzing file: {}", full.display());
        Ok(Self { path: full, bytes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the target as an image. Modules that need pixel data call
    /// this; a non-image target surfaces as a `ModuleError` the runner can
    /// isolate.
    pub fn image(&self) -> Result<DynamicImage, ModuleError> {
        Ok(image::load_from_memory(&self.bytes)?)
    }
}
