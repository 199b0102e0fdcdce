use engine::{Module, ModuleError, OutputSink, Target};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::util::encode_png;

/// Color-map analysis for palette-style images. The palette is recovered
/// as the distinct colors of the image in first-seen order; for every
/// requested index, a black/white mask of the pixels using that entry is
/// reported as a PNG candidate.
pub struct ColorMapModule {
    requested: Vec<usize>,
}

const MAX_PALETTE: usize = 256;

impl ColorMapModule {
    pub fn new(requested: Vec<usize>) -> Self {
        Self { requested }
    }

    pub fn from_config(config: &engine::ScanConfig) -> Self {
        let requested = if let Some((start, end)) = config.color_map_range {
            // The palette never exceeds MAX_PALETTE entries, so anything
            // past that would only be skipped later; clamp before
            // materializing the range.
            (start..=end.min(MAX_PALETTE - 1)).collect()
        } else {
            config.color_map.clone().unwrap_or_default()
        };
        Self::new(requested)
    }
}

impl Module for ColorMapModule {
    fn name(&self) -> &'static str {
        "color_map"
    }

    fn description(&self) -> &'static str {
        "Analyze a color map"
    }

    fn run(&self, target: &Target, sink: &dyn OutputSink) -> Result<(), ModuleError> {
        let rgba = target.image()?.to_rgba8();
        let palette = build_palette(&rgba)?;
        log::info!("Color map has {} entries", palette.len());
        for (index, color) in palette.iter().enumerate() {
            log::debug!("  [{index}] {color:?}");
        }

        for &index in &self.requested {
            let Some(&color) = palette.get(index) else {
                log::warn!(
                    "Color map index {index} out of range ({} entries)",
                    palette.len()
                );
                continue;
            };
            let mask = mask_for_color(&rgba, color);
            let bytes = encode_png(&mask)?;
            sink.test_output(&bytes)?;
        }
        Ok(())
    }
}

/// Distinct RGB colors in first-seen order, capped at a palette-sized
/// count. More distinct colors than that means the image is not
/// palette-based and the analysis does not apply.
fn build_palette(img: &RgbaImage) -> Result<Vec<[u8; 3]>, ModuleError> {
    let mut palette: Vec<[u8; 3]> = Vec::new();
    for pixel in img.pixels() {
        let color = [pixel[0], pixel[1], pixel[2]];
        if !palette.contains(&color) {
            if palette.len() == MAX_PALETTE {
                return Err(ModuleError::Analysis(format!(
                    "more than {MAX_PALETTE} distinct colors; not a palette image"
                )));
            }
            palette.push(color);
        }
    }
    Ok(palette)
}

fn mask_for_color(img: &RgbaImage, color: [u8; 3]) -> RgbaImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        if [p[0], p[1], p[2]] == color {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}
