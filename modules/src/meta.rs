use std::io::Cursor;

use engine::{Module, ModuleError, OutputSink, Target};
use exif::{In, Reader, Tag};

/// EXIF metadata inspection. Logs every field and hands comment-bearing
/// or oversized values, plus any embedded thumbnail, to triage.
pub struct MetaModule;

// Fields above this size are reported as candidates even when they are
// not comment tags; EXIF values this large usually carry a payload.
const OVERSIZED_FIELD: usize = 1000;

impl Module for MetaModule {
    fn name(&self) -> &'static str {
        "meta"
    }

    fn description(&self) -> &'static str {
        "Check file for metadata information"
    }

    fn run(&self, target: &Target, sink: &dyn OutputSink) -> Result<(), ModuleError> {
        let mut cursor = Cursor::new(target.bytes());
        let exif = Reader::new()
            .read_from_container(&mut cursor)
            .map_err(|err| ModuleError::Metadata(err.to_string()))?;

        for field in exif.fields() {
            let value = field.display_value().to_string();
            log::info!("{}: {}", field.tag, value);

            let candidate = matches!(field.tag, Tag::UserComment | Tag::ImageDescription)
                || value.len() > OVERSIZED_FIELD;
            if candidate {
                sink.test_output(value.as_bytes())?;
            }
        }

        // An embedded thumbnail is its own image; hand it to triage whole.
        if let Some(thumbnail) = thumbnail_bytes(&exif) {
            log::info!("Embedded thumbnail: {} bytes", thumbnail.len());
            sink.test_output(thumbnail)?;
        }

        Ok(())
    }
}

fn thumbnail_bytes(exif: &exif::Exif) -> Option<&[u8]> {
    for ifd in [In::THUMBNAIL, In::PRIMARY] {
        let offset = exif
            .get_field(Tag::JPEGInterchangeFormat, ifd)
            .and_then(|f| f.value.get_uint(0));
        let length = exif
            .get_field(Tag::JPEGInterchangeFormatLength, ifd)
            .and_then(|f| f.value.get_uint(0));
        if let (Some(offset), Some(length)) = (offset, length) {
            // Offsets are relative to the TIFF header, which is where the
            // raw buffer starts.
            let (offset, length) = (offset as usize, length as usize);
            return exif.buf().get(offset..offset.checked_add(length)?);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_without_exif_is_a_module_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.bin");
        std::fs::write(&path, b"no metadata in here at all").unwrap();
        let target = Target::open(&path).unwrap();

        struct NullSink;
        impl OutputSink for NullSink {
            fn test_output(
                &self,
                bytes: &[u8],
            ) -> Result<engine::Verdict, engine::EngineError> {
                Ok(engine::classify(bytes))
            }
        }

        let err = MetaModule.run(&target, &NullSink).unwrap_err();
        assert!(matches!(err, ModuleError::Metadata(_)));
    }
}
