use infer::Infer;

/// What the triage step decided about a candidate byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Undifferentiated binary noise; dropped.
    Generic,
    /// Structured content worth keeping, with a human-readable label.
    Interesting { label: String },
}

impl Verdict {
    pub fn is_interesting(&self) -> bool {
        matches!(self, Verdict::Interesting { .. })
    }
}

/// Decides whether recovered bytes are worth keeping, from content alone.
///
/// Anything with a recognizable structure is interesting; only the
/// octet-stream-like rest is noise. Plain text counts as interesting too,
/// same as the `file` command would report it. Pure: no side effects.
pub fn classify(bytes: &[u8]) -> Verdict {
    if bytes.is_empty() {
        return Verdict::Generic;
    }
    if let Some(kind) = Infer::new().get(bytes) {
        return Verdict::Interesting {
            label: describe(bytes, kind.mime_type()),
        };
    }
    if looks_like_text(bytes) {
        return Verdict::Interesting {
            label: "ASCII text".to_string(),
        };
    }
    Verdict::Generic
}

/// Descriptive label for a sniffed type, preferring signature-specific
/// names over the bare MIME type.
fn describe(bytes: &[u8], mime: &str) -> String {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return "PNG image".to_string();
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "JPEG image".to_string();
    }
    if bytes.starts_with(&[0x47, 0x49, 0x46, 0x38]) {
        return "GIF image".to_string();
    }
    if bytes.starts_with(&[0x42, 0x4D]) {
        return "BMP image".to_string();
    }
    if bytes.starts_with(&[0x52, 0x49, 0x46, 0x46]) && bytes.len() >= 12 {
        match &bytes[8..12] {
            b"WAVE" => return "WAV audio (RIFF/WAVE)".to_string(),
            b"AVI " => return "AVI video (RIFF)".to_string(),
            b"WEBP" => return "WebP image (RIFF)".to_string(),
            _ => return "RIFF container".to_string(),
        }
    }
    if bytes.starts_with(&[0x25, 0x50, 0x44, 0x46]) {
        return "PDF document".to_string();
    }
    if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
        return "ZIP archive".to_string();
    }
    if bytes.starts_with(&[0x52, 0x61, 0x72, 0x21]) {
        return "RAR archive".to_string();
    }
    if bytes.starts_with(&[0x37, 0x7A, 0xBC, 0xAF]) {
        return "7-Zip archive".to_string();
    }
    if bytes.starts_with(&[0x1F, 0x8B]) {
        return "gzip compressed data".to_string();
    }
    if bytes.starts_with(&[0x7F, 0x45, 0x4C, 0x46]) {
        return "ELF executable".to_string();
    }
    if bytes.starts_with(&[0x66, 0x4C, 0x61, 0x43]) {
        return "FLAC audio".to_string();
    }
    if bytes.starts_with(&[0x49, 0x44, 0x33]) {
        return "MP3 audio (with ID3)".to_string();
    }
    format!("{mime} data")
}

/// Printable-UTF-8 heuristic standing in for libmagic's text detection.
fn looks_like_text(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    printable * 100 >= total * 95
}
