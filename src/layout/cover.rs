use crate::foundation::core::Rect;
use crate::layout::aspect::CanvasDimensions;

/// Placement of a source image that fully covers the canvas without distortion.
///
/// The image is scaled uniformly; the overflowing axis is centered, so its offset is
/// `-(overflow) / 2` and the other offset is zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Left edge of the drawn image (zero or negative).
    pub offset_x: f64,
    /// Top edge of the drawn image (zero or negative).
    pub offset_y: f64,
    /// Drawn width, always `>= canvas width`.
    pub draw_width: f64,
    /// Drawn height, always `>= canvas height`.
    pub draw_height: f64,
}

impl CoverFit {
    /// Compute the cover placement of a `natural_width × natural_height` image.
    ///
    /// Degenerate sources (zero or non-finite size) are treated as square so the result still
    /// covers the canvas.
    pub fn compute(natural_width: f64, natural_height: f64, canvas: CanvasDimensions) -> Self {
        let image_aspect = if natural_width > 0.0
            && natural_height > 0.0
            && natural_width.is_finite()
            && natural_height.is_finite()
        {
            natural_width / natural_height
        } else {
            1.0
        };
        let canvas_aspect = canvas.aspect();

        if image_aspect > canvas_aspect {
            let draw_height = canvas.height;
            let draw_width = canvas.height * image_aspect;
            Self {
                offset_x: -(draw_width - canvas.width) / 2.0,
                offset_y: 0.0,
                draw_width,
                draw_height,
            }
        } else {
            let draw_width = canvas.width;
            let draw_height = canvas.width / image_aspect;
            Self {
                offset_x: 0.0,
                offset_y: -(draw_height - canvas.height) / 2.0,
                draw_width,
                draw_height,
            }
        }
    }

    /// The destination rectangle in canvas space.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.offset_x + self.draw_width,
            self.offset_y + self.draw_height,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/cover.rs"]
mod tests;
