/// Module-selection flags, filled in from the command line by the CLI
/// layer. Plain data: path validation happens in `Session::new`, not here.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Check file for metadata information.
    pub meta: bool,
    /// Perform image transformations and keep the results.
    pub image_transform: bool,
    /// Brute force LSB steganography variants.
    pub brute_lsb: bool,
    /// Analyze the color map; entries are palette indexes to dump.
    /// `Some(vec![])` analyzes without dumping any index.
    pub color_map: Option<Vec<usize>>,
    /// Like `color_map` but an inclusive range of indexes to dump.
    pub color_map_range: Option<(usize, usize)>,
    /// Extract specific LSB planes, driven by the per-channel lists below.
    pub extract_lsb: bool,
    pub red: Vec<u8>,
    pub green: Vec<u8>,
    pub blue: Vec<u8>,
    pub alpha: Vec<u8>,
    /// Check for data trailing the encoded image.
    pub trailing: bool,
    /// Debug-level logging.
    pub debug: bool,
}
