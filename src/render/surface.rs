use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, FrameRGBA, Rect, Rgba8, Vec2};
use crate::foundation::error::{PosterError, PosterResult};
use crate::layout::aspect::CanvasDimensions;

/// Horizontal anchoring of text relative to the `x` it is drawn at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the horizontal center.
    Center,
    /// `x` is the right edge.
    Right,
}

impl TextAlign {
    /// Left edge of a run of `width` anchored at `x`.
    pub fn start_x(self, x: f64, width: f64) -> f64 {
        match self {
            Self::Left => x,
            Self::Center => x - width / 2.0,
            Self::Right => x - width,
        }
    }
}

/// One render's drawing surface.
///
/// Draw calls are recorded in order on a `vello_cpu` context and rasterized by
/// [`Surface::finish`]; later calls paint over earlier ones. Coordinates are logical canvas
/// pixels; the raster is `floor(width) × floor(height)`.
pub struct Surface {
    ctx: vello_cpu::RenderContext,
    dims: CanvasDimensions,
    width_px: u16,
    height_px: u16,
    text_align: TextAlign,
}

impl Surface {
    /// Acquire a surface for `dims`.
    pub fn new(dims: CanvasDimensions) -> PosterResult<Self> {
        let w = dims.pixel_width();
        let h = dims.pixel_height();
        if w == 0 || h == 0 {
            return Err(PosterError::surface(format!(
                "canvas {}x{} has no pixels",
                dims.width, dims.height
            )));
        }
        let width_px: u16 = w
            .try_into()
            .map_err(|_| PosterError::surface("surface width exceeds u16"))?;
        let height_px: u16 = h
            .try_into()
            .map_err(|_| PosterError::surface("surface height exceeds u16"))?;

        Ok(Self {
            ctx: vello_cpu::RenderContext::new(width_px, height_px),
            dims,
            width_px,
            height_px,
            text_align: TextAlign::Left,
        })
    }

    /// Logical canvas size.
    pub fn dimensions(&self) -> CanvasDimensions {
        self.dims
    }

    /// Current text alignment.
    pub fn text_align(&self) -> TextAlign {
        self.text_align
    }

    /// Run `f` with `align` as the text alignment, then restore the previous alignment.
    pub fn with_text_align<R>(&mut self, align: TextAlign, f: impl FnOnce(&mut Self) -> R) -> R {
        let prev = std::mem::replace(&mut self.text_align, align);
        let out = f(self);
        self.text_align = prev;
        out
    }

    /// Fill an axis-aligned rectangle with a solid color. Non-finite rectangles draw nothing.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        if !rect.is_finite() {
            return;
        }
        self.reset_state();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color.to_cpu_color());
        self.ctx.fill_rect(&to_cpu_rect(rect));
    }

    /// Draw a horizontal line of `thickness` centered on `y`.
    pub fn stroke_hline(&mut self, x0: f64, x1: f64, y: f64, thickness: f64, color: Rgba8) {
        let half = thickness / 2.0;
        self.fill_rect(Rect::new(x0, y - half, x1, y + half), color);
    }

    /// Draw premultiplied pixels stretched into `dest`.
    pub fn draw_image(&mut self, image: &PreparedImage, dest: Rect) -> PosterResult<()> {
        if image.width == 0 || image.height == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }
        let paint = image_paint(image)?;
        let sx = dest.width() / f64::from(image.width);
        let sy = dest.height() / f64::from(image.height);
        let tr = Affine::translate(Vec2::new(dest.x0, dest.y0)) * Affine::scale_non_uniform(sx, sy);

        self.reset_state();
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    /// Fill positioned glyphs of one font face, translated by `origin`.
    pub(crate) fn fill_glyphs(
        &mut self,
        font: &vello_cpu::peniko::FontData,
        font_size: f32,
        origin: Vec2,
        color: Rgba8,
        glyphs: impl Iterator<Item = vello_cpu::Glyph>,
    ) {
        self.reset_state();
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate(origin)));
        self.ctx.set_paint(color.to_cpu_color());
        self.ctx
            .glyph_run(font)
            .font_size(font_size)
            .fill_glyphs(glyphs);
    }

    /// Rasterize everything drawn so far.
    pub fn finish(mut self) -> FrameRGBA {
        let mut pixmap = vello_cpu::Pixmap::new(self.width_px, self.height_px);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: u32::from(self.width_px),
            height: u32::from(self.height_px),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn reset_state(&mut self) {
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

fn image_paint(image: &PreparedImage) -> PosterResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PosterResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::validation(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::validation(format!("image height {height} exceeds u16")))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PosterError::validation("image byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn to_cpu_rect(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
