use engine::{Module, ModuleError, OutputSink, Target};
use image::RgbaImage;

use crate::util::pack_bits_msb_first;

/// Targeted LSB extraction: the caller names which bit indexes to pull
/// from each channel, and the module assembles a single bit stream in
/// red, green, blue, alpha order per pixel.
pub struct ExtractLsbModule {
    red: Vec<u8>,
    green: Vec<u8>,
    blue: Vec<u8>,
    alpha: Vec<u8>,
}

impl ExtractLsbModule {
    pub fn new(red: Vec<u8>, green: Vec<u8>, blue: Vec<u8>, alpha: Vec<u8>) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    fn plan(&self) -> [(usize, &[u8]); 4] {
        [
            (0, self.red.as_slice()),
            (1, self.green.as_slice()),
            (2, self.blue.as_slice()),
            (3, self.alpha.as_slice()),
        ]
    }
}

impl Module for ExtractLsbModule {
    fn name(&self) -> &'static str {
        "extract_lsb"
    }

    fn description(&self) -> &'static str {
        "Extract a specific LSB RGB from the image"
    }

    fn run(&self, target: &Target, sink: &dyn OutputSink) -> Result<(), ModuleError> {
        if self.plan().iter().all(|(_, indexes)| indexes.is_empty()) {
            return Err(ModuleError::Analysis(
                "no channel indexes requested; use --red/--green/--blue/--alpha".to_string(),
            ));
        }
        // Channel samples are 8 bits; a larger index would overflow the
        // shift instead of selecting a bit.
        if let Some(&bad) = self
            .plan()
            .iter()
            .flat_map(|(_, indexes)| indexes.iter())
            .find(|&&bit| bit > 7)
        {
            return Err(ModuleError::Analysis(format!(
                "bit index {bad} out of range; valid indexes are 0-7"
            )));
        }

        let rgba = target.image()?.to_rgba8();
        let bytes = extract(&rgba, &self.plan());
        log::info!("extracted {} bytes", bytes.len());
        sink.test_output(&bytes)?;
        Ok(())
    }
}

fn extract(img: &RgbaImage, plan: &[(usize, &[u8])]) -> Vec<u8> {
    let bits = img.pixels().flat_map(|pixel| {
        plan.iter().flat_map(move |(channel, indexes)| {
            indexes.iter().map(move |&bit| (pixel[*channel] >> bit) & 1)
        })
    });
    pack_bits_msb_first(bits)
}
