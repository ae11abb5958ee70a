use crate::foundation::core::Rect;
use crate::foundation::error::PosterResult;
use crate::layout::aspect::{AspectRatio, CanvasDimensions};
use crate::render::shadow::DropShadow;
use crate::render::surface::{Surface, TextAlign};
use crate::render::templates::{Metrics, TemplateInput, draw_mark};
use crate::text::font::FontSpec;
use crate::text::typesetter::Typesetter;

const MARK_WIDTH: f64 = 0.35;
const MARK_TOP: f64 = 0.08;
const MARK_SHADOW_BLUR: f64 = 20.0;

/// Resolved geometry of the modern-center template.
#[derive(Clone, Debug, PartialEq)]
pub struct ModernCenterLayout {
    /// Shared metrics.
    pub metrics: Metrics,
    /// Horizontal center every text run is anchored on.
    pub center_x: f64,
    /// Brand-mark rectangle, `None` on follow-up cards.
    pub mark: Option<Rect>,
    /// Date/city caption baseline, `None` on follow-up cards.
    pub caption_baseline: Option<f64>,
    /// Badge box, `None` on follow-up cards.
    pub badge: Option<Rect>,
    /// Badge label baseline.
    pub badge_baseline: f64,
    /// Headline baselines, top to bottom.
    pub baselines: Vec<f64>,
}

impl ModernCenterLayout {
    /// Badge label face for a canvas.
    pub fn badge_font(dims: CanvasDimensions) -> FontSpec {
        FontSpec::bold((dims.width * 0.035).floor() as f32)
    }

    /// Caption face for a canvas.
    pub fn caption_font(dims: CanvasDimensions) -> FontSpec {
        FontSpec::bold((dims.width * 0.025).floor() as f32)
    }

    /// Geometry for a mark of natural aspect `mark_h_per_w`, a category label
    /// `category_width` wide and `line_count` headline lines.
    pub fn compute(
        dims: CanvasDimensions,
        aspect: AspectRatio,
        mark_h_per_w: f64,
        category_width: f64,
        line_count: usize,
        is_follow_up: bool,
    ) -> Self {
        let metrics = Metrics::for_dims(dims);
        let p = metrics.padding;
        let center_x = dims.width / 2.0;

        let mark_w = dims.width * MARK_WIDTH;
        let mark_h = mark_h_per_w * mark_w;
        let mark_y = dims.height * MARK_TOP;
        let mark_x = (dims.width - mark_w) / 2.0;

        let box_h = f64::from(Self::badge_font(dims).size_px) * 1.8;
        let spacing = p * 0.6;
        let header_h = if is_follow_up { 0.0 } else { box_h + spacing };
        let total = header_h + line_count as f64 * metrics.line_height;
        let margin_bottom = if aspect == AspectRatio::Story {
            p * 3.0
        } else {
            p * 2.0
        };
        let start_y = dims.height - margin_bottom - total;
        let badge_w = category_width + p;

        let hero = !is_follow_up;
        Self {
            metrics,
            center_x,
            mark: hero.then(|| Rect::new(mark_x, mark_y, mark_x + mark_w, mark_y + mark_h)),
            caption_baseline: hero.then(|| mark_y + mark_h + p * 0.4),
            badge: hero.then(|| {
                let x = (dims.width - badge_w) / 2.0;
                Rect::new(x, start_y, x + badge_w, start_y + box_h)
            }),
            badge_baseline: start_y + box_h * 0.7,
            baselines: metrics.headline_baselines(start_y + header_h, line_count),
        }
    }
}

/// Caption text: `"MMM DD, YYYY | CITY"`, upper-cased.
pub fn caption_text(date: chrono::NaiveDate, city: &str) -> String {
    format!("{} | {}", date.format("%b %d, %Y"), city).to_uppercase()
}

pub(crate) fn draw(
    surface: &mut Surface,
    ts: &mut dyn Typesetter,
    input: &TemplateInput<'_>,
) -> PosterResult<()> {
    let dims = surface.dimensions();
    let category = input.category.to_uppercase();
    let badge_font = ModernCenterLayout::badge_font(dims);
    let category_width = ts.measure_width(&category, &badge_font);
    let mark_h_per_w = input.mark.height_for_width(1.0);
    let layout = ModernCenterLayout::compute(
        dims,
        input.aspect,
        mark_h_per_w,
        category_width,
        input.lines.len(),
        input.is_follow_up,
    );

    if let Some(dest) = layout.mark {
        draw_mark(surface, input.mark, dest, Some(DropShadow::black(MARK_SHADOW_BLUR)))?;
    }

    let color = input.palette.text;
    let cx = layout.center_x;
    surface.with_text_align(TextAlign::Center, |surface| -> PosterResult<()> {
        if let Some(baseline) = layout.caption_baseline {
            let caption = caption_text(input.date, input.city);
            let font = ModernCenterLayout::caption_font(dims);
            ts.fill_text(surface, &caption, &font, cx, baseline, color)?;
        }

        if let Some(badge) = layout.badge {
            surface.fill_rect(badge, input.palette.badge);
            ts.fill_text(surface, &category, &badge_font, cx, layout.badge_baseline, color)?;
        }

        let headline = layout.metrics.headline_font();
        for (line, &baseline) in input.lines.iter().zip(&layout.baselines) {
            ts.fill_text(surface, line.trim(), &headline, cx, baseline, color)?;
        }
        Ok(())
    })
}
