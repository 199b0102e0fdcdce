use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ConfigError, EngineError};

/// Sole writer for kept findings. Stored names compose a UTC timestamp
/// with a process-monotonic sequence number, so two findings persisted in
/// the same instant can never collide, and writes go through a temporary
/// file so a partial write is never visible under a final name.
#[derive(Debug)]
pub struct ResultStore {
    directory: PathBuf,
    sequence: AtomicU64,
}

impl ResultStore {
    /// Validates the results directory, creating it (and parents) if
    /// absent. A path that exists but is not a directory fails here.
    pub fn create<P: AsRef<Path>>(directory: P) -> Result<Self, ConfigError> {
        let dir = directory.as_ref();
        if dir.exists() && !dir.is_dir() {
            return Err(ConfigError::OutputNotADirectory(dir.to_path_buf()));
        }
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::OutputUnavailable {
            path: dir.to_path_buf(),
            source,
        })?;
        let directory =
            std::fs::canonicalize(dir).map_err(|source| ConfigError::OutputUnavailable {
                path: dir.to_path_buf(),
                source,
            })?;
        log::info!("Results directory: {}", directory.display());
        Ok(Self {
            directory,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Durably writes `bytes` under a fresh name and returns its path.
    ///
    /// The write lands in a temporary file inside the results directory
    /// and is promoted with a no-clobber rename; if the final name somehow
    /// already exists, the next sequence number is tried instead of
    /// overwriting.
    pub fn persist(&self, bytes: &[u8]) -> Result<PathBuf, EngineError> {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f").to_string();
        loop {
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
            let path = self.directory.join(format!("{stamp}_{seq:04}"));

            let mut tmp = tempfile::NamedTempFile::new_in(&self.directory)
                .map_err(|source| EngineError::Storage { source })?;
            tmp.write_all(bytes)
                .map_err(|source| EngineError::Storage { source })?;

            match tmp.persist_noclobber(&path) {
                Ok(_) => return Ok(path),
                Err(err) if err.error.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(EngineError::Storage { source: err.error }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::create(dir.path()).unwrap();

        let path = store.persist(b"finding").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"finding");
    }

    #[test]
    fn test_rapid_persists_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::create(dir.path()).unwrap();

        let a = store.persist(b"one").unwrap();
        let b = store.persist(b"two").unwrap();
        assert_ne!(a, b);
        assert_eq!(std::fs::read(&a).unwrap(), b"one");
        assert_eq!(std::fs::read(&b).unwrap(), b"two");
    }

    #[test]
    fn test_output_path_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();

        let err = ResultStore::create(&file).unwrap_err();
        assert!(matches!(err, ConfigError::OutputNotADirectory(_)));
    }

    #[test]
    fn test_missing_directory_is_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("results");

        let store = ResultStore::create(&nested).unwrap();
        assert!(store.directory().is_dir());
    }

    #[test]
    fn test_no_leftover_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::create(dir.path()).unwrap();
        store.persist(b"x").unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
