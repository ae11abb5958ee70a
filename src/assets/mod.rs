pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod source;
pub(crate) mod svg_raster;

/// Built-in standard brand mark (SVG).
pub const STANDARD_MARK_SVG: &[u8] = include_bytes!("marks/standard.svg");
/// Built-in white brand mark (SVG), used on dark centered layouts.
pub const WHITE_MARK_SVG: &[u8] = include_bytes!("marks/white.svg");

/// In-memory URI the engine registers [`STANDARD_MARK_SVG`] under.
pub const STANDARD_MARK_URI: &str = "mem:brand/standard";
/// In-memory URI the engine registers [`WHITE_MARK_SVG`] under.
pub const WHITE_MARK_URI: &str = "mem:brand/white";
