use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::PosterResult;
use crate::layout::aspect::{AspectRatio, CanvasDimensions};
use crate::render::surface::{Surface, TextAlign};
use crate::render::templates::{Metrics, TemplateInput, draw_mark};
use crate::text::font::FontSpec;
use crate::text::typesetter::Typesetter;

const MARK_WIDTH: f64 = 0.12;
const ACCENT_WIDTH: f64 = 0.012;
const RULE_THICKNESS: f64 = 2.0;

/// Resolved geometry of the minimal-top template.
#[derive(Clone, Debug, PartialEq)]
pub struct MinimalTopLayout {
    /// Shared metrics.
    pub metrics: Metrics,
    /// Brand-mark rectangle, `None` on follow-up cards.
    pub mark: Option<Rect>,
    /// Rule `(x0, x1, y)`, `None` on follow-up cards.
    pub rule: Option<(f64, f64, f64)>,
    /// Date anchor `(right x, baseline)`, `None` on follow-up cards.
    pub date: Option<(f64, f64)>,
    /// Vertical accent bar spanning the headline block.
    pub accent: Rect,
    /// Left edge of headline lines.
    pub text_x: f64,
    /// Headline baselines, top to bottom.
    pub baselines: Vec<f64>,
}

impl MinimalTopLayout {
    /// Date face for a canvas.
    pub fn date_font(dims: CanvasDimensions) -> FontSpec {
        FontSpec::bold((dims.width * 0.025).floor() as f32)
    }

    /// Geometry for a mark of natural aspect `mark_h_per_w` and `line_count` headline lines.
    pub fn compute(
        dims: CanvasDimensions,
        aspect: AspectRatio,
        mark_h_per_w: f64,
        line_count: usize,
        is_follow_up: bool,
    ) -> Self {
        let metrics = Metrics::for_dims(dims);
        let p = metrics.padding;
        let mark_w = dims.width * MARK_WIDTH;
        let mark_h = mark_h_per_w * mark_w;

        let accent_w = dims.width * ACCENT_WIDTH;
        let margin_bottom = if aspect == AspectRatio::Story {
            p * 3.0
        } else {
            p * 2.0
        };
        let total = line_count as f64 * metrics.line_height;
        let start_y = dims.height - margin_bottom - total;
        let accent_y = start_y + metrics.headline_px * 0.2;

        let hero = !is_follow_up;
        Self {
            metrics,
            mark: hero.then(|| Rect::new(p, p, p + mark_w, p + mark_h)),
            rule: hero.then(|| (p, dims.width - p, p + mark_h + p * 0.4)),
            date: hero.then(|| (dims.width - p, p + mark_h * 0.7)),
            accent: Rect::new(p, accent_y, p + accent_w, accent_y + total),
            text_x: p + accent_w + p * 0.5,
            baselines: metrics.headline_baselines(start_y, line_count),
        }
    }
}

/// Date text: `"MMM D, YYYY"`, upper-cased.
pub fn date_text(date: chrono::NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string().to_uppercase()
}

pub(crate) fn draw(
    surface: &mut Surface,
    ts: &mut dyn Typesetter,
    input: &TemplateInput<'_>,
) -> PosterResult<()> {
    let dims = surface.dimensions();
    let layout = MinimalTopLayout::compute(
        dims,
        input.aspect,
        input.mark.height_for_width(1.0),
        input.lines.len(),
        input.is_follow_up,
    );
    let color = input.palette.text;

    if let Some((x0, x1, y)) = layout.rule {
        surface.stroke_hline(x0, x1, y, RULE_THICKNESS, Rgba8::WHITE.with_alpha_f32(0.3));
    }
    if let Some(dest) = layout.mark {
        draw_mark(surface, input.mark, dest, None)?;
    }
    if let Some((right, baseline)) = layout.date {
        let font = MinimalTopLayout::date_font(dims);
        let text = date_text(input.date);
        let faded = Rgba8 {
            a: ((f64::from(color.a) * 0.9).round()) as u8,
            ..color
        };
        surface.with_text_align(TextAlign::Right, |surface| {
            ts.fill_text(surface, &text, &font, right, baseline, faded)
        })?;
    }

    surface.fill_rect(layout.accent, input.palette.accent);
    let headline = FontSpec::black_italic(layout.metrics.headline_px as f32);
    for (line, &baseline) in input.lines.iter().zip(&layout.baselines) {
        ts.fill_text(surface, line, &headline, layout.text_x, baseline, color)?;
    }
    Ok(())
}
