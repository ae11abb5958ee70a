use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::Rect;
use crate::foundation::error::PosterResult;
use crate::render::surface::Surface;

/// One stop of a black vertical gradient: `offset` through the band, straight alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaStop {
    /// Position in `[0, 1]` from the band's top.
    pub offset: f64,
    /// Opacity of black at this stop.
    pub alpha: f64,
}

/// Fraction of the canvas height covered by the overlay, measured from the bottom.
pub const SCRIM_FRACTION: f64 = 0.5;

/// Stops of the legibility overlay.
pub const SCRIM_STOPS: [AlphaStop; 3] = [
    AlphaStop {
        offset: 0.0,
        alpha: 0.0,
    },
    AlphaStop {
        offset: 0.7,
        alpha: 0.85,
    },
    AlphaStop {
        offset: 1.0,
        alpha: 0.95,
    },
];

/// Piecewise-linear opacity at `t` through the band; clamps outside the first and last stop.
pub fn alpha_at(stops: &[AlphaStop], t: f64) -> f64 {
    let Some(first) = stops.first() else {
        return 0.0;
    };
    if t <= first.offset {
        return first.alpha;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= 0.0 {
                return b.alpha;
            }
            return a.alpha + (b.alpha - a.alpha) * (t - a.offset) / span;
        }
    }
    stops.last().map_or(0.0, |s| s.alpha)
}

/// Darken the bottom half of the canvas with [`SCRIM_STOPS`].
pub fn draw_bottom_scrim(surface: &mut Surface) -> PosterResult<()> {
    let dims = surface.dimensions();
    let band_top = dims.height * (1.0 - SCRIM_FRACTION);
    let band = dims.height - band_top;
    let rows = band.ceil().max(1.0) as u32;
    let cols = dims.pixel_width().max(1);

    let image = gradient_image(&SCRIM_STOPS, cols, rows);
    surface.draw_image(&image, Rect::new(0.0, band_top, dims.width, dims.height))?;
    tracing::debug!(band_top, rows, "bottom gradient drawn");
    Ok(())
}

/// Premultiplied black gradient of `width × rows`, sampled at row centers.
fn gradient_image(stops: &[AlphaStop], width: u32, rows: u32) -> PreparedImage {
    let mut bytes = vec![0u8; (width as usize) * (rows as usize) * 4];
    for y in 0..rows {
        let t = (f64::from(y) + 0.5) / f64::from(rows);
        let a = (alpha_at(stops, t) * 255.0).round().clamp(0.0, 255.0) as u8;
        let row = &mut bytes[(y as usize) * (width as usize) * 4..][..(width as usize) * 4];
        for px in row.chunks_exact_mut(4) {
            // Black premultiplies to zero color channels.
            px.copy_from_slice(&[0, 0, 0, a]);
        }
    }
    PreparedImage {
        width,
        height: rows,
        rgba8_premul: Arc::new(bytes),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/gradient.rs"]
mod tests;
