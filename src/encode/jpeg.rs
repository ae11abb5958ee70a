use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::{premul_rgba8_to_rgb8_over_black, unpremultiply_rgba8};
use crate::layout::aspect::CanvasDimensions;

/// Quality factor for published posters.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.9;

/// Output container.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", tag = "format")]
pub enum OutputFormat {
    /// Lossy JPEG; `quality` is a factor in `(0, 1]`.
    Jpeg {
        /// Quality factor; 0.9 maps to encoder quality 90.
        quality: f32,
    },
    /// Lossless PNG with alpha.
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    /// MIME type of the encoded bytes.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

/// A finished poster.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedPoster {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime: &'static str,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Logical canvas size the layout used; may be fractional.
    pub dimensions: CanvasDimensions,
}

/// Map a quality factor to the encoder's 1..=100 scale.
pub fn jpeg_quality(factor: f32) -> u8 {
    if !factor.is_finite() {
        return 90;
    }
    (factor * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Serialize a finished frame.
///
/// JPEG has no alpha, so transparent regions flatten onto black.
pub fn encode_frame(
    frame: &FrameRGBA,
    format: OutputFormat,
    dimensions: CanvasDimensions,
) -> PosterResult<EncodedPoster> {
    if frame.width == 0 || frame.height == 0 {
        return Err(PosterError::encode("frame has zero dimensions"));
    }
    let expected = (frame.width as usize)
        .checked_mul(frame.height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| PosterError::encode("frame size overflow"))?;
    if frame.data.len() != expected {
        return Err(PosterError::encode(format!(
            "frame data is {} bytes, expected {expected}",
            frame.data.len()
        )));
    }

    let mut bytes = Vec::new();
    match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = if frame.premultiplied {
                premul_rgba8_to_rgb8_over_black(&frame.data)
            } else {
                straight_rgba8_to_rgb8_over_black(&frame.data)
            };
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut bytes,
                jpeg_quality(quality),
            );
            encoder
                .encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
                .context("encode jpeg")
                .map_err(|e| PosterError::encode(format!("{e:#}")))?;
        }
        OutputFormat::Png => {
            let rgba = if frame.premultiplied {
                unpremultiply_rgba8(&frame.data)
            } else {
                frame.data.clone()
            };
            let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
                .ok_or_else(|| PosterError::encode("png buffer size mismatch"))?;
            img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                .context("encode png")
                .map_err(|e| PosterError::encode(format!("{e:#}")))?;
        }
    }

    tracing::debug!(
        mime = format.mime(),
        width = frame.width,
        height = frame.height,
        bytes = bytes.len(),
        "poster encoded"
    );
    Ok(EncodedPoster {
        bytes,
        mime: format.mime(),
        width: frame.width,
        height: frame.height,
        dimensions,
    })
}

fn straight_rgba8_to_rgb8_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = u16::from(px[3]);
        for &c in &px[..3] {
            out.push(((u16::from(c) * a + 127) / 255) as u8);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/jpeg.rs"]
mod tests;
