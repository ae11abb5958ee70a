use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::error::{PosterError, PosterResult};

/// Largest edge a mark may be rasterized at.
const MAX_EDGE: u32 = 8_192;

/// Rasterize `tree` stretched over a `width × height` destination.
///
/// The pixmap is rounded up to whole pixels, so the surface scales it down by less than one
/// pixel when drawing.
pub(crate) fn rasterize_at(
    tree: &usvg::Tree,
    width: f64,
    height: f64,
) -> PosterResult<PreparedImage> {
    let w = edge_px(width)?;
    let h = edge_px(height)?;
    let natural = tree.size();
    let scale = (
        f64::from(w) / f64::from(natural.width()),
        f64::from(h) / f64::from(natural.height()),
    );
    rasterize_window(tree, scale, (0.0, 0.0), w, h)
}

/// Rasterize a `width × height` pixel window of `tree` scaled by `scale`, with the tree's origin
/// placed at `origin` in window pixels.
pub(crate) fn rasterize_window(
    tree: &usvg::Tree,
    scale: (f64, f64),
    origin: (f64, f64),
    width: u32,
    height: u32,
) -> PosterResult<PreparedImage> {
    if width > MAX_EDGE || height > MAX_EDGE {
        return Err(PosterError::validation(format!(
            "svg window {width}x{height} exceeds {MAX_EDGE}px"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        PosterError::validation(format!("svg window {width}x{height} has no pixels"))
    })?;
    let xform = resvg::tiny_skia::Transform::from_row(
        scale.0 as f32,
        0.0,
        0.0,
        scale.1 as f32,
        origin.0 as f32,
        origin.1 as f32,
    );
    resvg::render(tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}

fn edge_px(v: f64) -> PosterResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(PosterError::validation(format!(
            "mark draw size must be finite and > 0, got {v}"
        )));
    }
    let px = v.ceil();
    if px > f64::from(MAX_EDGE) {
        return Err(PosterError::validation(format!(
            "mark draw size {v} exceeds {MAX_EDGE}px"
        )));
    }
    Ok(px as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
