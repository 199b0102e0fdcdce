use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

use engine::{ModuleOutcome, Session};

#[derive(Serialize, Debug)]
pub struct RunReport {
    pub file_info: FileInfo,
    pub results_directory: String,
    pub modules: Vec<ModuleOutcome>,
    pub findings: u64,
    pub timestamp: String,
}

#[derive(Serialize, Debug)]
pub struct FileInfo {
    pub path: String,
    pub size_bytes: u64,
    pub detected_type: Option<String>,
}

impl RunReport {
    pub fn build(session: &Session) -> Self {
        let bytes = session.target().bytes();
        let detected_type = infer::Infer::new()
            .get(bytes)
            .map(|kind| kind.mime_type().to_string());

        Self {
            file_info: FileInfo {
                path: session.target().path().to_string_lossy().to_string(),
                size_bytes: bytes.len() as u64,
                detected_type,
            },
            results_directory: session.results_directory().to_string_lossy().to_string(),
            modules: session.record().clone(),
            findings: session.findings(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::ScanConfig;

    #[test]
    fn test_report_serializes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        std::fs::write(&input, [0u8; 16]).unwrap();
        let session = Session::new(&input, dir.path().join("results"), ScanConfig::default())
            .unwrap();

        let report = RunReport::build(&session);
        assert_eq!(report.file_info.size_bytes, 16);
        assert!(report.file_info.detected_type.is_none());
        assert!(serde_json::to_string_pretty(&report).is_ok());
    }

    #[test]
    fn test_report_saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        std::fs::write(&input, [0u8; 16]).unwrap();
        let session = Session::new(&input, dir.path().join("results"), ScanConfig::default())
            .unwrap();

        let out = dir.path().join("report.json");
        RunReport::build(&session).save_to_file(&out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("file_info"));
    }
}
