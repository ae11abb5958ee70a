use crate::foundation::core::Rect;
use crate::foundation::error::PosterResult;
use crate::layout::aspect::{AspectRatio, CanvasDimensions};
use crate::render::shadow::DropShadow;
use crate::render::surface::Surface;
use crate::render::templates::{Metrics, TemplateInput, draw_mark, mark_rect};
use crate::text::font::FontSpec;
use crate::text::typesetter::Typesetter;

const MARK_WIDTH: f64 = 0.15;
const MARK_SHADOW_BLUR: f64 = 15.0;

/// Resolved geometry of the classic template.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassicLayout {
    /// Shared metrics.
    pub metrics: Metrics,
    /// Badge label face.
    pub badge_font: FontSpec,
    /// Badge box, `None` on follow-up cards.
    pub badge: Option<Rect>,
    /// Badge label origin `(x, baseline)`.
    pub badge_text: (f64, f64),
    /// Left edge of headline lines.
    pub text_x: f64,
    /// Headline baselines, top to bottom.
    pub baselines: Vec<f64>,
}

impl ClassicLayout {
    /// Badge label face for a canvas.
    pub fn badge_font(dims: CanvasDimensions) -> FontSpec {
        FontSpec::bold((dims.width * 0.03).floor() as f32)
    }

    /// Geometry for `line_count` headline lines and a category label `category_width` wide.
    pub fn compute(
        dims: CanvasDimensions,
        aspect: AspectRatio,
        category_width: f64,
        line_count: usize,
        is_follow_up: bool,
    ) -> Self {
        let metrics = Metrics::for_dims(dims);
        let p = metrics.padding;
        let badge_font = Self::badge_font(dims);
        let pad_x = p * 0.4;
        let box_h = f64::from(badge_font.size_px) * 1.8;
        let spacing = p * 0.5;

        let header_h = if is_follow_up { 0.0 } else { box_h + spacing };
        let total = header_h + line_count as f64 * metrics.line_height;
        let margin_bottom = if aspect == AspectRatio::Story {
            p * 2.5
        } else {
            p * 1.5
        };
        let start_y = dims.height - margin_bottom - total;

        let badge = (!is_follow_up)
            .then(|| Rect::new(p, start_y, p + category_width + pad_x * 2.0, start_y + box_h));

        Self {
            metrics,
            badge_font,
            badge,
            badge_text: (p + pad_x, start_y + box_h * 0.7),
            text_x: p,
            baselines: metrics.headline_baselines(start_y + header_h, line_count),
        }
    }

    /// Brand-mark width for a canvas.
    pub fn mark_width(dims: CanvasDimensions) -> f64 {
        dims.width * MARK_WIDTH
    }
}

pub(crate) fn draw(
    surface: &mut Surface,
    ts: &mut dyn Typesetter,
    input: &TemplateInput<'_>,
) -> PosterResult<()> {
    let dims = surface.dimensions();
    let category = input.category.to_uppercase();
    let badge_font = ClassicLayout::badge_font(dims);
    let category_width = ts.measure_width(&category, &badge_font);
    let layout = ClassicLayout::compute(
        dims,
        input.aspect,
        category_width,
        input.lines.len(),
        input.is_follow_up,
    );
    let p = layout.metrics.padding;

    if !input.is_follow_up {
        let dest = mark_rect(input.mark, p, p, ClassicLayout::mark_width(dims));
        draw_mark(surface, input.mark, dest, Some(DropShadow::black(MARK_SHADOW_BLUR)))?;
    }

    if let Some(badge) = layout.badge {
        surface.fill_rect(badge, input.palette.badge);
        let (x, y) = layout.badge_text;
        ts.fill_text(surface, &category, &badge_font, x, y, input.palette.text)?;
    }

    let headline = layout.metrics.headline_font();
    for (line, &baseline) in input.lines.iter().zip(&layout.baselines) {
        ts.fill_text(surface, line, &headline, layout.text_x, baseline, input.palette.text)?;
    }
    Ok(())
}
