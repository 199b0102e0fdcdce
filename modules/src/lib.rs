pub mod brute_lsb;
pub mod color_map;
pub mod extract_lsb;
pub mod image_transform;
pub mod meta;
pub mod trailing;

mod util;

use engine::{Module, ScanConfig};

/// Builds the execution list for a session: one entry per enabled
/// capability, in fixed declaration order. Adding a module means adding a
/// branch here; the runner never changes.
pub fn enabled_modules(config: &ScanConfig) -> Vec<Box<dyn Module>> {
    let mut list: Vec<Box<dyn Module>> = Vec::new();
    if config.meta {
        list.push(Box::new(meta::MetaModule));
    }
    if config.image_transform {
        list.push(Box::new(image_transform::ImageTransformModule));
    }
    if config.brute_lsb {
        list.push(Box::new(brute_lsb::BruteLsbModule));
    }
    if config.color_map.is_some() || config.color_map_range.is_some() {
        list.push(Box::new(color_map::ColorMapModule::from_config(config)));
    }
    if config.extract_lsb {
        list.push(Box::new(extract_lsb::ExtractLsbModule::new(
            config.red.clone(),
            config.green.clone(),
            config.blue.clone(),
            config.alpha.clone(),
        )));
    }
    if config.trailing {
        list.push(Box::new(trailing::TrailingModule));
    }
    list
}
