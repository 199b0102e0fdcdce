use engine::{Module, ModuleError, OutputSink, Target};

/// Trailing-data check: locate where the encoded image actually ends in
/// the raw file and report everything after it. Appended archives and
/// payloads are the oldest trick in the book.
pub struct TrailingModule;

impl Module for TrailingModule {
    fn name(&self) -> &'static str {
        "trailing"
    }

    fn description(&self) -> &'static str {
        "Check for trailing data on the given file"
    }

    fn run(&self, target: &Target, sink: &dyn OutputSink) -> Result<(), ModuleError> {
        let bytes = target.bytes();
        let end = image_end_offset(bytes).ok_or_else(|| {
            ModuleError::Analysis(
                "unrecognized container; cannot locate end of image data".to_string(),
            )
        })?;

        let rest = &bytes[end..];
        if rest.is_empty() {
            log::info!("No trailing data");
            return Ok(());
        }
        log::info!("Found {} bytes of trailing data at offset {end:#x}", rest.len());
        sink.test_output(rest)?;
        Ok(())
    }
}

/// Offset one past the end of the encoded image, for the containers whose
/// end is cheap to find.
fn image_end_offset(data: &[u8]) -> Option<usize> {
    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    if data.starts_with(&PNG_MAGIC) {
        return png_end(data, PNG_MAGIC.len());
    }
    if data.starts_with(&[0xFF, 0xD8]) {
        // FF bytes in entropy-coded data are stuffed with 00, so the first
        // FF D9 really is the end-of-image marker.
        return data
            .windows(2)
            .position(|w| w == [0xFF, 0xD9])
            .map(|i| i + 2);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return gif_end(data);
    }
    if data.starts_with(&[0x42, 0x4D]) && data.len() >= 6 {
        let declared = u32::from_le_bytes([data[2], data[3], data[4], data[5]]) as usize;
        if declared > 0 && declared <= data.len() {
            return Some(declared);
        }
    }
    None
}

/// Walks PNG chunks until IEND and returns the offset right after its CRC.
fn png_end(data: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes(data[pos..pos + 4].try_into().ok()?) as usize;
        let kind = &data[pos + 4..pos + 8];
        let end = pos.checked_add(12 + len)?;
        if end > data.len() {
            return None;
        }
        if kind == b"IEND" {
            return Some(end);
        }
        pos = end;
    }
    None
}

/// Walks GIF blocks (extensions, image descriptors and their color
/// tables and sub-blocks) until the 0x3B trailer and returns the offset
/// right after it. Scanning for a bare 0x3B would misfire on pixel data.
fn gif_end(data: &[u8]) -> Option<usize> {
    // header (6) + logical screen descriptor (7)
    let mut pos = 13usize;
    let packed = *data.get(10)?;
    if packed & 0x80 != 0 {
        pos = pos.checked_add(3 * (1usize << ((packed & 0x07) + 1)))?;
    }
    loop {
        match *data.get(pos)? {
            0x3B => return Some(pos + 1),
            0x21 => {
                // extension introducer + label, then sub-blocks
                pos = skip_sub_blocks(data, pos.checked_add(2)?)?;
            }
            0x2C => {
                let packed = *data.get(pos.checked_add(9)?)?;
                let mut next = pos.checked_add(10)?;
                if packed & 0x80 != 0 {
                    next = next.checked_add(3 * (1usize << ((packed & 0x07) + 1)))?;
                }
                // LZW minimum code size byte, then image sub-blocks
                pos = skip_sub_blocks(data, next.checked_add(1)?)?;
            }
            _ => return None,
        }
    }
}

fn skip_sub_blocks(data: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let len = *data.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            return Some(pos);
        }
        pos = pos.checked_add(len)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png(trailer: &[u8]) -> Vec<u8> {
        let mut v = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        // zero-length stand-in chunks; CRCs are not checked here
        v.extend_from_slice(&[0, 0, 0, 0, b'I', b'H', b'D', b'R', 0, 0, 0, 0]);
        v.extend_from_slice(&[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
        v.extend_from_slice(trailer);
        v
    }

    #[test]
    fn test_png_end_is_after_iend_crc() {
        let data = tiny_png(b"SECRET");
        let end = image_end_offset(&data).unwrap();
        assert_eq!(&data[end..], b"SECRET");
    }

    #[test]
    fn test_clean_png_has_no_trailing_bytes() {
        let data = tiny_png(b"");
        assert_eq!(image_end_offset(&data).unwrap(), data.len());
    }

    #[test]
    fn test_jpeg_end_is_after_eoi() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02, 0xFF, 0xD9, b'X', b'Y'];
        let end = image_end_offset(&data).unwrap();
        assert_eq!(&data[end..], b"XY");
    }

    fn tiny_gif(trailer: &[u8]) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(b"GIF89a");
        // logical screen descriptor, no global color table
        v.extend_from_slice(&[2, 0, 2, 0, 0x00, 0, 0]);
        // graphic control extension
        v.extend_from_slice(&[0x21, 0xF9, 4, 0, 0, 0, 0, 0]);
        // image descriptor, no local color table
        v.extend_from_slice(&[0x2C, 0, 0, 0, 0, 2, 0, 2, 0, 0x00]);
        // LZW minimum code size + one data sub-block + terminator
        v.extend_from_slice(&[0x02, 2, 0x4C, 0x01, 0x00]);
        v.push(0x3B);
        v.extend_from_slice(trailer);
        v
    }

    #[test]
    fn test_gif_end_is_after_trailer() {
        let data = tiny_gif(b"SECRET");
        let end = image_end_offset(&data).unwrap();
        assert_eq!(&data[end..], b"SECRET");
    }

    #[test]
    fn test_clean_gif_has_no_trailing_bytes() {
        let data = tiny_gif(b"");
        assert_eq!(image_end_offset(&data).unwrap(), data.len());
    }

    #[test]
    fn test_gif_trailer_byte_inside_pixel_data_is_not_the_end() {
        // 0x3B appears inside the image sub-block; the block walk must
        // step over it instead of taking it for the trailer.
        let mut v = Vec::new();
        v.extend_from_slice(b"GIF89a");
        v.extend_from_slice(&[2, 0, 2, 0, 0x00, 0, 0]);
        v.extend_from_slice(&[0x2C, 0, 0, 0, 0, 2, 0, 2, 0, 0x00]);
        v.extend_from_slice(&[0x02, 3, 0x3B, 0x3B, 0x3B, 0x00]);
        v.push(0x3B);
        v.extend_from_slice(b"XY");
        let end = image_end_offset(&v).unwrap();
        assert_eq!(&v[end..], b"XY");
    }

    #[test]
    fn test_bmp_end_uses_declared_size() {
        let mut data = vec![0x42, 0x4D, 8, 0, 0, 0, 0, 0];
        data.extend_from_slice(b"hidden");
        let end = image_end_offset(&data).unwrap();
        assert_eq!(&data[end..], b"hidden");
    }

    #[test]
    fn test_unknown_container_is_unsupported() {
        assert_eq!(image_end_offset(b"plain bytes"), None);
    }

    #[test]
    fn test_trailing_run_reports_the_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        std::fs::write(&path, tiny_png(b"the quick brown fox jumps over")).unwrap();
        let target = Target::open(&path).unwrap();

        #[derive(Default)]
        struct CollectSink(std::cell::RefCell<Vec<Vec<u8>>>);
        impl OutputSink for CollectSink {
            fn test_output(
                &self,
                bytes: &[u8],
            ) -> Result<engine::Verdict, engine::EngineError> {
                self.0.borrow_mut().push(bytes.to_vec());
                Ok(engine::classify(bytes))
            }
        }

        let sink = CollectSink::default();
        TrailingModule.run(&target, &sink).unwrap();
        let reported = sink.0.into_inner();
        assert_eq!(reported, vec![b"the quick brown fox jumps over".to_vec()]);
    }
}
