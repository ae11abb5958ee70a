//! ktpost composites branded social posts from a photograph and a headline.
//!
//! One render turns a [`RenderOptions`] value into one encoded raster:
//!
//! 1. **Resolve**: the aspect ratio picks fixed [`CanvasDimensions`] at a base width of 1080.
//! 2. **Load**: the background and the brand mark are fetched and decoded concurrently.
//! 3. **Compose**: cover-fit background, bottom gradient, wrapped headline and one of three
//!    templates are drawn in order onto a single surface.
//! 4. **Encode**: the surface is serialized to JPEG (quality 0.9) or PNG.
//!
//! Any failure aborts the call; no partial poster is ever returned.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No hidden reads**: the default template is injected by the caller, see
//!   [`resolve_template`].
//! - **Deterministic**: identical inputs, fonts and date render identical pixels.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod carousel;
mod config;
mod encode;
mod engine;
mod foundation;
mod layout;
mod render;
mod text;

pub use assets::decode::{
    AssetHandle, PreparedImage, PreparedSvg, decode_asset, decode_image, parse_svg,
};
pub use assets::loader::{AssetLoader, LoadedAssets};
pub use assets::source::{BlobStore, ImageSource, unescape_ampersands};
pub use assets::{STANDARD_MARK_SVG, STANDARD_MARK_URI, WHITE_MARK_SVG, WHITE_MARK_URI};
pub use carousel::{CarouselPlan, MAX_CARDS};
pub use config::{
    BrandConfig, Clock, EngineConfig, FixedClock, FontConfig, JsonPreferenceFile,
    MemoryPreferences, PreferenceStore, SystemClock, TEMPLATE_PREFERENCE_KEY, resolve_template,
};
pub use encode::jpeg::{
    DEFAULT_JPEG_QUALITY, EncodedPoster, OutputFormat, encode_frame, jpeg_quality,
};
pub use engine::{PosterEngine, PosterEngineBuilder, RenderOptions};
pub use foundation::core::{Affine, FrameRGBA, Point, Rect, Rgba8, Rgba8Premul, Size, Vec2};
pub use foundation::error::{AssetRole, PosterError, PosterResult};
pub use layout::aspect::{AspectRatio, BASE_WIDTH, CanvasDimensions, best_aspect_ratio};
pub use layout::cover::CoverFit;
pub use layout::wrap::{TextMeasurer, WrappedTitle, wrap_title, wrap_words};
pub use render::gradient::{AlphaStop, SCRIM_FRACTION, SCRIM_STOPS, alpha_at, draw_bottom_scrim};
pub use render::shadow::{DropShadow, draw_mark};
pub use render::surface::{Surface, TextAlign};
pub use render::templates::minimal_top::date_text;
pub use render::templates::modern_center::caption_text;
pub use render::templates::{
    ClassicLayout, Metrics, MinimalTopLayout, ModernCenterLayout, Palette, TemplateId,
    TemplateInput, draw_template,
};
pub use text::font::{FontFaceData, FontSet, FontSpec, WEIGHT_BLACK, WEIGHT_BOLD};
pub use text::typesetter::{
    FixedAdvanceTypesetter, ParleyTypesetter, TextBrushRgba8, Typesetter, TypesetterSource,
};
