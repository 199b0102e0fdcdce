use std::io::Cursor;

use engine::ModuleError;
use image::{ImageFormat, RgbaImage};

/// In-memory PNG encoding, so image-shaped candidates go through the
/// session's triage instead of being saved directly.
pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ModuleError> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Packs a bit stream into bytes, first bit into the high bit of each
/// byte. A trailing partial byte is dropped.
pub(crate) fn pack_bits_msb_first(bits: impl IntoIterator<Item = u8>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc = 0u8;
    let mut filled = 0u8;
    for bit in bits {
        acc = (acc << 1) | (bit & 1);
        filled += 1;
        if filled == 8 {
            out.push(acc);
            acc = 0;
            filled = 0;
        }
    }
    out
}

/// Packs a bit stream into bytes, first bit into the low bit of each byte.
pub(crate) fn pack_bits_lsb_first(bits: impl IntoIterator<Item = u8>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc = 0u8;
    let mut filled = 0u8;
    for bit in bits {
        acc |= (bit & 1) << filled;
        filled += 1;
        if filled == 8 {
            out.push(acc);
            acc = 0;
            filled = 0;
        }
    }
    out
}

/// The bits of `bytes`, most significant first. Inverse of
/// `pack_bits_msb_first`.
#[cfg(test)]
pub(crate) fn bits_of(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_packing() {
        let bits = [1, 0, 0, 0, 0, 0, 0, 1, 0, 1];
        assert_eq!(pack_bits_msb_first(bits), vec![0b1000_0001]);
    }

    #[test]
    fn test_lsb_first_packing() {
        let bits = [1, 0, 0, 0, 0, 0, 0, 1];
        assert_eq!(pack_bits_lsb_first(bits), vec![0b1000_0001]);
    }

    #[test]
    fn test_bits_round_trip() {
        let bytes = b"steg".to_vec();
        assert_eq!(pack_bits_msb_first(bits_of(&bytes)), bytes);
    }

    #[test]
    fn test_encode_png_is_sniffable() {
        let img = RgbaImage::from_fn(4, 4, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
        let bytes = encode_png(&img).unwrap();
        assert!(bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
    }
}
