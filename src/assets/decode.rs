use std::sync::Arc;

use anyhow::Context;

use crate::assets::svg_raster;
use crate::foundation::core::Rect;
use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::layout::aspect::CanvasDimensions;
use crate::layout::cover::CoverFit;

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Parsed SVG document.
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

/// A decoded image with its natural size; raster or vector.
#[derive(Clone, Debug)]
pub enum AssetHandle {
    /// Bitmap decoded by the `image` crate.
    Raster(PreparedImage),
    /// SVG document, rasterized on demand at draw size.
    Vector(PreparedSvg),
}

impl AssetHandle {
    /// Natural `(width, height)` in pixels (SVG user units for vectors).
    pub fn natural_size(&self) -> (f64, f64) {
        match self {
            Self::Raster(img) => (f64::from(img.width), f64::from(img.height)),
            Self::Vector(svg) => {
                let size = svg.tree.size();
                (f64::from(size.width()), f64::from(size.height()))
            }
        }
    }

    /// Height that preserves the natural aspect ratio at `width`.
    pub fn height_for_width(&self, width: f64) -> f64 {
        let (w, h) = self.natural_size();
        if w <= 0.0 {
            return 0.0;
        }
        h / w * width
    }

    /// Pixels to draw into a `width × height` destination.
    ///
    /// Rasters larger than the destination are downscaled to it; smaller ones are returned
    /// as-is and scaled up by the surface. Vectors are rasterized at the destination size.
    pub fn pixels_for(&self, width: f64, height: f64) -> PosterResult<PreparedImage> {
        match self {
            Self::Raster(img) => {
                let full = (0, 0, img.width, img.height);
                crop_and_shrink(img, full, width, height)
            }
            Self::Vector(svg) => svg_raster::rasterize_at(&svg.tree, width, height),
        }
    }

    /// The part of a cover-fitted image that lands on `canvas`, and the rectangle to draw it in.
    ///
    /// Only source pixels inside the canvas are kept, and they are downscaled to at most their
    /// drawn size, so the result stays near the canvas size whatever the natural size.
    pub fn cover_pixels(
        &self,
        fit: &CoverFit,
        canvas: CanvasDimensions,
    ) -> PosterResult<(PreparedImage, Rect)> {
        match self {
            Self::Raster(img) => {
                if img.width == 0 || img.height == 0 {
                    return Ok((img.clone(), fit.rect()));
                }
                let sx = fit.draw_width / f64::from(img.width);
                let sy = fit.draw_height / f64::from(img.height);
                let (x0, x1) = visible_span(fit.offset_x, sx, canvas.width, img.width);
                let (y0, y1) = visible_span(fit.offset_y, sy, canvas.height, img.height);
                let dest = Rect::new(
                    fit.offset_x + f64::from(x0) * sx,
                    fit.offset_y + f64::from(y0) * sy,
                    fit.offset_x + f64::from(x1) * sx,
                    fit.offset_y + f64::from(y1) * sy,
                );
                let pixels =
                    crop_and_shrink(img, (x0, y0, x1 - x0, y1 - y0), dest.width(), dest.height())?;
                Ok((pixels, dest))
            }
            Self::Vector(svg) => {
                let (w, h) = (canvas.pixel_width(), canvas.pixel_height());
                let (nat_w, nat_h) = self.natural_size();
                if nat_w <= 0.0 || nat_h <= 0.0 {
                    return Err(PosterError::validation("svg has no natural size"));
                }
                let pixels = svg_raster::rasterize_window(
                    &svg.tree,
                    (fit.draw_width / nat_w, fit.draw_height / nat_h),
                    (fit.offset_x, fit.offset_y),
                    w,
                    h,
                )?;
                Ok((pixels, Rect::new(0.0, 0.0, f64::from(w), f64::from(h))))
            }
        }
    }
}

/// Source pixel range `[lo, hi)` whose scaled image overlaps `[0, extent)` in canvas space.
fn visible_span(offset: f64, scale: f64, extent: f64, natural: u32) -> (u32, u32) {
    let last = f64::from(natural - 1);
    let lo = (-offset / scale).floor().clamp(0.0, last);
    let hi = ((extent - offset) / scale).ceil().clamp(lo + 1.0, f64::from(natural));
    (lo as u32, hi as u32)
}

/// Crop `region` (x, y, w, h) out of `img` and downscale it to fit `width × height`.
fn crop_and_shrink(
    img: &PreparedImage,
    region: (u32, u32, u32, u32),
    width: f64,
    height: f64,
) -> PosterResult<PreparedImage> {
    let (x, y, w, h) = region;
    let target_w = target_edge(width, w);
    let target_h = target_edge(height, h);
    if (x, y, w, h) == (0, 0, img.width, img.height) && (target_w, target_h) == (w, h) {
        return Ok(img.clone());
    }

    let src = image::ImageBuffer::<image::Rgba<u8>, &[u8]>::from_raw(
        img.width,
        img.height,
        img.rgba8_premul.as_slice(),
    )
    .ok_or_else(|| PosterError::validation("image byte length does not match its size"))?;
    let view = image::imageops::crop_imm(&src, x, y, w, h);
    let (view_w, view_h) = image::GenericImageView::dimensions(&*view);
    let cropped: image::RgbaImage = image::ImageBuffer::from_fn(view_w, view_h, |px, py| {
        image::GenericImageView::get_pixel(&*view, px, py)
    });
    // Channels stay premultiplied through the linear filter.
    let out = if (target_w, target_h) == (w, h) {
        cropped
    } else {
        image::imageops::resize(
            &cropped,
            target_w,
            target_h,
            image::imageops::FilterType::Triangle,
        )
    };
    Ok(PreparedImage {
        width: out.width(),
        height: out.height(),
        rgba8_premul: Arc::new(out.into_raw()),
    })
}

/// Pixel edge for drawing `source` pixels across `drawn` canvas pixels: never upscaled.
fn target_edge(drawn: f64, source: u32) -> u32 {
    if !drawn.is_finite() || drawn <= 0.0 {
        return source;
    }
    (drawn.ceil() as u32).clamp(1, source.max(1))
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> PosterResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a prepared `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> PosterResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Decode bytes as SVG when they look like markup, otherwise as a bitmap.
pub fn decode_asset(bytes: &[u8]) -> PosterResult<AssetHandle> {
    if looks_like_svg(bytes) {
        parse_svg(bytes).map(AssetHandle::Vector)
    } else {
        decode_image(bytes).map(AssetHandle::Raster)
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
