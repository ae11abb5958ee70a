//! The three layout templates.
//!
//! Each variant is one pure function over a [`TemplateInput`]: geometry is recomputed from the
//! canvas dimensions on every call and nothing is kept between renders. Adding a template means
//! adding one [`TemplateId`] variant and one module.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::assets::decode::AssetHandle;
use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{PosterError, PosterResult};
use crate::layout::aspect::{AspectRatio, CanvasDimensions};
use crate::render::shadow::{self, DropShadow};
use crate::render::surface::Surface;
use crate::text::font::FontSpec;
use crate::text::typesetter::Typesetter;

pub(crate) mod classic;
pub(crate) mod minimal_top;
pub(crate) mod modern_center;

pub use classic::ClassicLayout;
pub use minimal_top::MinimalTopLayout;
pub use modern_center::ModernCenterLayout;

/// Layout template selection.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    /// Mark top-left with shadow, badge and headline bottom-left.
    #[default]
    Classic,
    /// Large white mark centered with a date line; everything centered.
    ModernCenter,
    /// Small mark with a rule and date; italic headline beside an accent bar.
    MinimalTop,
}

impl TemplateId {
    /// All variants in declaration order.
    pub const ALL: [Self; 3] = [Self::Classic, Self::ModernCenter, Self::MinimalTop];

    /// Identifier used in options, preferences and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::ModernCenter => "modern-center",
            Self::MinimalTop => "minimal-top",
        }
    }

    /// Return `true` when this template draws the white brand-mark variant.
    pub fn uses_white_mark(self) -> bool {
        matches!(self, Self::ModernCenter)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                PosterError::validation(format!(
                    "unknown template '{s}' (expected classic, modern-center or minimal-top)"
                ))
            })
    }
}

/// Brand colors used by the templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Category badge fill.
    pub badge: Rgba8,
    /// minimal-top accent bar.
    pub accent: Rgba8,
    /// Headline, badge and caption text.
    pub text: Rgba8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            badge: Rgba8::rgb(0x00, 0x70, 0xc0),
            accent: Rgba8::rgb(0xe1, 0xb2, 0x50),
            text: Rgba8::WHITE,
        }
    }
}

/// Measurements every template derives from the canvas width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    /// Outer padding, 5.5 % of the width.
    pub padding: f64,
    /// Headline size, `floor(0.06 × width)`.
    pub headline_px: f64,
    /// Widest a headline line may measure.
    pub max_width: f64,
    /// Distance between headline baselines.
    pub line_height: f64,
}

impl Metrics {
    /// Metrics for a canvas.
    pub fn for_dims(dims: CanvasDimensions) -> Self {
        let padding = dims.width * 0.055;
        let headline_px = (dims.width * 0.06).floor();
        Self {
            padding,
            headline_px,
            max_width: dims.width - padding * 2.0,
            line_height: headline_px * 1.2,
        }
    }

    /// Upright black headline face.
    pub fn headline_font(&self) -> FontSpec {
        FontSpec::black(self.headline_px as f32)
    }

    /// Baseline of a headline line whose box starts at `top`.
    pub fn headline_baseline(&self, top: f64) -> f64 {
        top + self.headline_px * 0.8
    }

    /// Baselines of `count` stacked headline lines starting at `top`.
    pub fn headline_baselines(&self, top: f64, count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| self.headline_baseline(top + i as f64 * self.line_height))
            .collect()
    }
}

/// Everything a template needs besides the surface and the typesetter.
#[derive(Clone, Copy, Debug)]
pub struct TemplateInput<'a> {
    /// Target aspect ratio; 9:16 widens bottom margins.
    pub aspect: AspectRatio,
    /// Brand mark already resolved for this template.
    pub mark: &'a AssetHandle,
    /// Wrapped and truncated headline lines.
    pub lines: &'a [String],
    /// Category label as given; templates upper-case it.
    pub category: &'a str,
    /// Non-hero carousel card: no badge, no mark.
    pub is_follow_up: bool,
    /// Date shown in captions.
    pub date: NaiveDate,
    /// City shown in the modern-center caption.
    pub city: &'a str,
    /// Brand colors.
    pub palette: Palette,
}

/// Draw `template` onto a surface that already holds the background and gradient.
pub fn draw_template(
    template: TemplateId,
    surface: &mut Surface,
    typesetter: &mut dyn Typesetter,
    input: &TemplateInput<'_>,
) -> PosterResult<()> {
    match template {
        TemplateId::Classic => classic::draw(surface, typesetter, input),
        TemplateId::ModernCenter => modern_center::draw(surface, typesetter, input),
        TemplateId::MinimalTop => minimal_top::draw(surface, typesetter, input),
    }?;
    tracing::debug!(
        template = %template,
        lines = input.lines.len(),
        follow_up = input.is_follow_up,
        "template drawn"
    );
    Ok(())
}

/// Brand-mark rectangle `width` wide at `(x, y)`, keeping the mark's natural aspect.
pub(crate) fn mark_rect(mark: &AssetHandle, x: f64, y: f64, width: f64) -> Rect {
    Rect::new(x, y, x + width, y + mark.height_for_width(width))
}

/// Rasterize the mark at its draw size and composite it.
pub(crate) fn draw_mark(
    surface: &mut Surface,
    mark: &AssetHandle,
    dest: Rect,
    shadow: Option<DropShadow>,
) -> PosterResult<()> {
    if dest.width() <= 0.0 || dest.height() <= 0.0 {
        return Ok(());
    }
    let pixels = mark.pixels_for(dest.width(), dest.height())?;
    shadow::draw_mark(surface, &pixels, dest, shadow)
}

#[cfg(test)]
#[path = "../../../tests/unit/render/templates/mod.rs"]
mod tests;
