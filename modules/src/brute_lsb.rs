use engine::{Module, ModuleError, OutputSink, Target};
use image::RgbaImage;

use crate::util::{pack_bits_lsb_first, pack_bits_msb_first};

/// Brute force over LSB steganography variants: for every channel and
/// each of the two lowest bit planes, assemble the bit stream in both bit
/// orders and let triage decide which variants carry structure.
pub struct BruteLsbModule;

const BIT_PLANES: u8 = 2;

impl Module for BruteLsbModule {
    fn name(&self) -> &'static str {
        "brute_lsb"
    }

    fn description(&self) -> &'static str {
        "Attempt to brute force any LSB related steganography"
    }

    fn run(&self, target: &Target, sink: &dyn OutputSink) -> Result<(), ModuleError> {
        let rgba = target.image()?.to_rgba8();
        for channel in 0..4 {
            for bit in 0..BIT_PLANES {
                log::debug!("brute force: channel {channel}, bit {bit}");
                sink.test_output(&assemble(&rgba, channel, bit, true))?;
                sink.test_output(&assemble(&rgba, channel, bit, false))?;
            }
        }
        Ok(())
    }
}

fn assemble(img: &RgbaImage, channel: usize, bit: u8, msb_first: bool) -> Vec<u8> {
    let bits = img.pixels().map(|p| (p[channel] >> bit) & 1);
    if msb_first {
        pack_bits_msb_first(bits)
    } else {
        pack_bits_lsb_first(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::bits_of;
    use image::Rgba;

    /// Image whose red-channel LSBs spell out `payload`, MSB first.
    fn image_with_red_lsb_payload(payload: &[u8]) -> RgbaImage {
        let bits = bits_of(payload);
        let side = 8;
        RgbaImage::from_fn(side, side, |x, y| {
            let idx = (y * side + x) as usize;
            let bit = bits.get(idx).copied().unwrap_or(0);
            Rgba([0x80 | bit, 0x40, 0x20, 255])
        })
    }

    #[test]
    fn test_red_lsb_payload_is_recovered() {
        let img = image_with_red_lsb_payload(b"hidden");
        let recovered = assemble(&img, 0, 0, true);
        assert!(recovered.starts_with(b"hidden"));
    }

    #[test]
    fn test_other_channels_see_constant_bits() {
        let img = image_with_red_lsb_payload(b"hidden");
        // Green channel is 0x40 everywhere, so its LSB plane is all zeros.
        let green = assemble(&img, 1, 0, true);
        assert!(green.iter().all(|&b| b == 0));
    }
}
