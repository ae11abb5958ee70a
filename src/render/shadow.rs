use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::surface::Surface;

/// Zero-offset drop shadow cast by the brand mark.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropShadow {
    /// Blur extent in canvas pixels; the Gaussian sigma is half of it.
    pub blur: f64,
    /// Shadow tint, straight alpha.
    pub color: Rgba8,
}

impl DropShadow {
    /// Black at 40 % with the given blur.
    pub fn black(blur: f64) -> Self {
        Self {
            blur,
            color: Rgba8::BLACK.with_alpha_f32(0.4),
        }
    }

    fn sigma(self) -> f32 {
        (self.blur / 2.0) as f32
    }

    fn radius(self) -> u32 {
        (f64::from(self.sigma()) * 3.0).ceil().max(0.0) as u32
    }
}

/// Draw `mark` into `dest`, with its shadow beneath when `shadow` is set.
pub fn draw_mark(
    surface: &mut Surface,
    mark: &PreparedImage,
    dest: Rect,
    shadow: Option<DropShadow>,
) -> PosterResult<()> {
    if let Some(shadow) = shadow {
        if let Some((image, rect)) = shadow_image(mark, dest, shadow)? {
            surface.draw_image(&image, rect)?;
        }
    }
    surface.draw_image(mark, dest)
}

/// Shadow pixels for `mark` drawn at `dest`, and where they go.
///
/// The mark's alpha is resampled to draw size, padded by the blur radius, blurred and tinted.
/// Returns `None` when the destination is empty.
pub(crate) fn shadow_image(
    mark: &PreparedImage,
    dest: Rect,
    shadow: DropShadow,
) -> PosterResult<Option<(PreparedImage, Rect)>> {
    if mark.width == 0 || mark.height == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
        return Ok(None);
    }
    let inner_w = dest.width().ceil() as u32;
    let inner_h = dest.height().ceil() as u32;
    let pad = shadow.radius();
    let w = inner_w + 2 * pad;
    let h = inner_h + 2 * pad;

    let mut alpha = vec![0u8; (w as usize) * (h as usize)];
    for y in 0..inner_h {
        let sy = ((f64::from(y) + 0.5) * f64::from(mark.height) / dest.height()) as u32;
        let sy = sy.min(mark.height - 1);
        for x in 0..inner_w {
            let sx = ((f64::from(x) + 0.5) * f64::from(mark.width) / dest.width()) as u32;
            let sx = sx.min(mark.width - 1);
            let src = ((sy as usize) * (mark.width as usize) + sx as usize) * 4 + 3;
            let dst = ((y + pad) as usize) * (w as usize) + (x + pad) as usize;
            alpha[dst] = mark.rgba8_premul[src];
        }
    }

    let blurred = blur_alpha(&alpha, w, h, pad, shadow.sigma())?;
    let tint = shadow.color.premultiplied();
    let mut rgba = Vec::with_capacity(blurred.len() * 4);
    for a in blurred {
        let a = u16::from(a);
        rgba.extend_from_slice(&[
            mul_div255_u8(u16::from(tint.r), a),
            mul_div255_u8(u16::from(tint.g), a),
            mul_div255_u8(u16::from(tint.b), a),
            mul_div255_u8(u16::from(tint.a), a),
        ]);
    }

    let pad = f64::from(pad);
    let rect = Rect::new(
        dest.x0 - pad,
        dest.y0 - pad,
        dest.x0 - pad + f64::from(w),
        dest.y0 - pad + f64::from(h),
    );
    Ok(Some((
        PreparedImage {
            width: w,
            height: h,
            rgba8_premul: Arc::new(rgba),
        },
        rect,
    )))
}

/// Separable Gaussian blur of a single 8-bit channel.
pub(crate) fn blur_alpha(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> PosterResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| PosterError::surface("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(PosterError::surface(
            "blur_alpha expects src matching width*height",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Normalized Gaussian weights in Q16; they sum to exactly `1 << 16`.
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> PosterResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PosterError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(PosterError::surface("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                acc += u64::from(kw) * u64::from(src[(y * w + sx) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                acc += u64::from(kw) * u64::from(src[(sy * w + x) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/shadow.rs"]
mod tests;
