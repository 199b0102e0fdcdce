use engine::{Module, ModuleError, OutputSink, Target};
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};

use crate::util::encode_png;

/// Channel isolation and contrast variants of the input image, reported
/// as PNG candidates. Hidden content often shows up when a single channel
/// is viewed on its own.
pub struct ImageTransformModule;

impl Module for ImageTransformModule {
    fn name(&self) -> &'static str {
        "image_transform"
    }

    fn description(&self) -> &'static str {
        "Perform various image transformations on the input image and save them to the output directory"
    }

    fn run(&self, target: &Target, sink: &dyn OutputSink) -> Result<(), ModuleError> {
        let image = target.image()?;
        for variant in transforms(&image) {
            let bytes = encode_png(&variant)?;
            sink.test_output(&bytes)?;
        }
        Ok(())
    }
}

fn transforms(input: &DynamicImage) -> Vec<RgbaImage> {
    let rgba = input.to_rgba8();
    let mut out = Vec::new();

    // Keep one channel, black out the rest.
    for channel in 0..4 {
        out.push(map_pixels(&rgba, |p| {
            let mut q = [0, 0, 0, 255];
            q[channel] = p[channel];
            Rgba(q)
        }));
    }
    // Saturate everything but one channel.
    for channel in 0..4 {
        out.push(map_pixels(&rgba, |p| {
            let mut q = [255, 255, 255, 255];
            q[channel] = p[channel];
            Rgba(q)
        }));
    }
    out.push(input.adjust_contrast(-10.0).into_rgba8());
    out.push(input.adjust_contrast(10.0).into_rgba8());
    out
}

fn map_pixels(img: &RgbaImage, f: impl Fn(&Rgba<u8>) -> Rgba<u8>) -> RgbaImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| f(img.get_pixel(x, y)))
}
