use std::fmt;
use std::str::FromStr;

use crate::foundation::error::PosterError;

/// Base canvas width shared by every aspect ratio.
pub const BASE_WIDTH: f64 = 1080.0;

/// The closed set of supported output aspect ratios.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum AspectRatio {
    /// Square feed post.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// Portrait feed post.
    #[serde(rename = "4:5")]
    Portrait,
    /// Landscape card.
    #[serde(rename = "16:9")]
    Landscape,
    /// Full-screen story.
    #[serde(rename = "9:16")]
    Story,
}

impl AspectRatio {
    /// All variants in declaration order.
    pub const ALL: [Self; 4] = [Self::Square, Self::Portrait, Self::Landscape, Self::Story];

    /// The `w:h` notation used in options and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "4:5",
            Self::Landscape => "16:9",
            Self::Story => "9:16",
        }
    }

    /// Maximum headline lines kept after wrapping.
    pub fn max_title_lines(self) -> usize {
        match self {
            Self::Landscape => 2,
            _ => 4,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| {
                PosterError::validation(format!(
                    "unknown aspect ratio '{s}' (expected 1:1, 4:5, 16:9 or 9:16)"
                ))
            })
    }
}

/// Pick the aspect ratio that suits a list of target platforms.
///
/// Matching is case-insensitive and the first rule that matches any platform wins:
/// stories, then Instagram/Facebook feeds, then landscape platforms, then square.
pub fn best_aspect_ratio<S: AsRef<str>>(platforms: &[S]) -> AspectRatio {
    let p: Vec<String> = platforms
        .iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .collect();
    let any = |names: &[&str]| p.iter().any(|x| names.contains(&x.as_str()));

    if any(&["story", "instagram_stories"]) {
        return AspectRatio::Story;
    }
    if any(&["instagram", "facebook"]) {
        return AspectRatio::Portrait;
    }
    if any(&["twitter", "x", "youtube", "linkedin"]) {
        return AspectRatio::Landscape;
    }
    AspectRatio::Square
}

/// Logical canvas size in CSS-like pixels.
///
/// `height` may be fractional (607.5 for 16:9) and is kept exact for all layout math. The
/// backing raster uses [`CanvasDimensions::pixel_width`] × [`CanvasDimensions::pixel_height`],
/// which floor the logical size; content past the last whole row is clipped.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasDimensions {
    /// Logical width.
    pub width: f64,
    /// Logical height.
    pub height: f64,
}

impl CanvasDimensions {
    /// Resolve the nominal dimensions for an aspect ratio at [`BASE_WIDTH`].
    pub fn for_aspect(aspect: AspectRatio) -> Self {
        let height = match aspect {
            AspectRatio::Square => BASE_WIDTH,
            AspectRatio::Portrait => 1350.0,
            AspectRatio::Landscape => BASE_WIDTH * 9.0 / 16.0,
            AspectRatio::Story => 1920.0,
        };
        Self {
            width: BASE_WIDTH,
            height,
        }
    }

    /// Width over height.
    pub fn aspect(self) -> f64 {
        self.width / self.height
    }

    /// Raster width in whole pixels (floor).
    pub fn pixel_width(self) -> u32 {
        self.width.max(0.0).floor() as u32
    }

    /// Raster height in whole pixels (floor).
    pub fn pixel_height(self) -> u32 {
        self.height.max(0.0).floor() as u32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/aspect.rs"]
mod tests;
