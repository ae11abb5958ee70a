use std::sync::Arc;

use super::*;
use crate::assets::decode::PreparedImage;
use crate::foundation::core::FrameRGBA;
use crate::render::surface::TextAlign;
use crate::text::typesetter::FixedAdvanceTypesetter;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn square() -> CanvasDimensions {
    CanvasDimensions::for_aspect(AspectRatio::Square)
}

fn white_mark(w: u32, h: u32) -> AssetHandle {
    AssetHandle::Raster(PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new([255u8; 4].repeat((w * h) as usize)),
    })
}

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
}

fn render(template: TemplateId, aspect: AspectRatio, is_follow_up: bool) -> (FrameRGBA, TextAlign) {
    let dims = CanvasDimensions::for_aspect(aspect);
    let mark = white_mark(4, 1);
    let lines = lines(&["UAE minister announces school", "bus trips now capped at 45–60", "minutes"]);
    let input = TemplateInput {
        aspect,
        mark: &mark,
        lines: &lines,
        category: "Education",
        is_follow_up,
        date: date(),
        city: "Dubai",
        palette: Palette::default(),
    };
    let mut surface = Surface::new(dims).unwrap();
    let mut ts = FixedAdvanceTypesetter::new(0.5);
    draw_template(template, &mut surface, &mut ts, &input).unwrap();
    let align = surface.text_align();
    (surface.finish(), align)
}

fn px(frame: &FrameRGBA, x: f64, y: f64) -> [u8; 4] {
    let i = (((y as u32) * frame.width + x as u32) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

const BADGE_BLUE: [u8; 4] = [0x00, 0x70, 0xc0, 0xff];

#[test]
fn template_ids_round_trip_through_text_and_serde() {
    for t in TemplateId::ALL {
        assert_eq!(t.as_str().parse::<TemplateId>().unwrap(), t);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, format!("\"{}\"", t.as_str()));
    }
    assert_eq!(" Modern-Center ".parse::<TemplateId>().unwrap(), TemplateId::ModernCenter);
    assert!(matches!("fancy".parse::<TemplateId>(), Err(PosterError::Validation(_))));
    assert_eq!(TemplateId::default(), TemplateId::Classic);
    assert!(TemplateId::ModernCenter.uses_white_mark());
    assert!(!TemplateId::Classic.uses_white_mark());
}

#[test]
fn metrics_follow_canvas_width() {
    let m = Metrics::for_dims(square());
    assert!(approx(m.padding, 59.4));
    assert_eq!(m.headline_px, 64.0);
    assert!(approx(m.max_width, 961.2));
    assert!(approx(m.line_height, 76.8));
    assert!(approx(m.headline_baseline(100.0), 151.2));
    // Landscape shares the width, so it shares the metrics.
    assert_eq!(Metrics::for_dims(CanvasDimensions::for_aspect(AspectRatio::Landscape)), m);
}

#[test]
fn classic_stacks_badge_and_lines_above_bottom_margin() {
    let l = ClassicLayout::compute(square(), AspectRatio::Square, 144.0, 3, false);
    // 1080 - 1.5p - (57.6 + 0.5p + 3 × 76.8)
    let start_y = 1080.0 - 89.1 - (57.6 + 29.7 + 230.4);
    let badge = l.badge.unwrap();
    assert!(approx(badge.y0, start_y));
    assert!(approx(badge.x0, 59.4));
    assert!(approx(badge.width(), 144.0 + 2.0 * 23.76));
    assert!(approx(badge.height(), 57.6));
    assert!(approx(l.badge_text.0, 59.4 + 23.76));
    assert!(approx(l.badge_text.1, start_y + 57.6 * 0.7));
    assert_eq!(l.baselines.len(), 3);
    assert!(approx(l.baselines[0], start_y + 57.6 + 29.7 + 51.2));
    assert!(approx(l.baselines[2] - l.baselines[0], 2.0 * 76.8));
    assert_eq!(l.badge_font.size_px, 32.0);
}

#[test]
fn classic_story_uses_wider_bottom_margin() {
    let dims = CanvasDimensions::for_aspect(AspectRatio::Story);
    let story = ClassicLayout::compute(dims, AspectRatio::Story, 100.0, 2, false);
    let other = ClassicLayout::compute(dims, AspectRatio::Portrait, 100.0, 2, false);
    assert!(approx(other.baselines[1] - story.baselines[1], 59.4));
}

#[test]
fn classic_follow_up_drops_badge_and_keeps_bottom_anchor() {
    let hero = ClassicLayout::compute(square(), AspectRatio::Square, 144.0, 2, false);
    let follow = ClassicLayout::compute(square(), AspectRatio::Square, 144.0, 2, true);
    assert!(follow.badge.is_none());
    assert_eq!(follow.baselines.last(), hero.baselines.last());
}

#[test]
fn modern_center_centers_mark_badge_and_caption() {
    // A 4:1 mark at 378 wide is 94.5 tall.
    let l = ModernCenterLayout::compute(square(), AspectRatio::Square, 0.25, 160.0, 2, false);
    let mark = l.mark.unwrap();
    assert!(approx(mark.x0, 351.0));
    assert!(approx(mark.width(), 378.0));
    assert!(approx(mark.y0, 86.4));
    assert!(approx(mark.height(), 94.5));
    assert!(approx(l.caption_baseline.unwrap(), 86.4 + 94.5 + 23.76));

    let badge = l.badge.unwrap();
    assert!(approx(badge.width(), 160.0 + 59.4));
    assert!(approx(badge.x0 + badge.width() / 2.0, 540.0));
    assert!(approx(badge.height(), 37.0 * 1.8));
    // 1080 - 2p - (box + 0.6p + 2 lines)
    assert!(approx(badge.y0, 1080.0 - 118.8 - (66.6 + 35.64 + 153.6)));
    assert_eq!(l.center_x, 540.0);
}

#[test]
fn modern_center_follow_up_has_no_header() {
    let l = ModernCenterLayout::compute(square(), AspectRatio::Square, 0.25, 160.0, 1, true);
    assert!(l.mark.is_none());
    assert!(l.caption_baseline.is_none());
    assert!(l.badge.is_none());
    assert!(approx(l.baselines[0], 1080.0 - 118.8 - 76.8 + 51.2));
}

#[test]
fn minimal_top_places_rule_date_and_accent() {
    // A 4:1 mark at 129.6 wide is 32.4 tall.
    let l = MinimalTopLayout::compute(square(), AspectRatio::Square, 0.25, 3, false);
    let mark = l.mark.unwrap();
    assert!(approx(mark.width(), 129.6));
    assert!(approx(mark.height(), 32.4));
    let (x0, x1, y) = l.rule.unwrap();
    assert!(approx(x0, 59.4));
    assert!(approx(x1, 1020.6));
    assert!(approx(y, 59.4 + 32.4 + 23.76));
    let (right, baseline) = l.date.unwrap();
    assert!(approx(right, 1020.6));
    assert!(approx(baseline, 59.4 + 32.4 * 0.7));

    let start_y = 1080.0 - 118.8 - 230.4;
    assert!(approx(l.accent.x0, 59.4));
    assert!(approx(l.accent.width(), 12.96));
    assert!(approx(l.accent.y0, start_y + 12.8));
    assert!(approx(l.accent.height(), 230.4));
    assert!(approx(l.text_x, 59.4 + 12.96 + 29.7));
    assert!(approx(l.baselines[0], start_y + 51.2));
}

#[test]
fn minimal_top_follow_up_keeps_accent_only() {
    let l = MinimalTopLayout::compute(square(), AspectRatio::Story, 0.25, 2, true);
    assert!(l.mark.is_none() && l.rule.is_none() && l.date.is_none());
    assert!(approx(l.accent.height(), 153.6));
}

#[test]
fn date_captions_use_their_own_formats() {
    assert_eq!(modern_center::caption_text(date(), "Dubai"), "MAR 07, 2026 | DUBAI");
    assert_eq!(minimal_top::date_text(date()), "MAR 7, 2026");
}

#[test]
fn classic_draws_blue_badge_and_top_left_mark() {
    let (frame, _) = render(TemplateId::Classic, AspectRatio::Square, false);
    let l = ClassicLayout::compute(square(), AspectRatio::Square, 144.0, 3, false);
    let badge = l.badge.unwrap();
    assert_eq!(px(&frame, badge.x0 + 2.0, badge.y0 + 3.0), BADGE_BLUE);
    // Mark: 162 × 40.5 at (59.4, 59.4).
    assert_eq!(px(&frame, 100.0, 80.0), [255, 255, 255, 255]);
    // Shadow halo just below the mark.
    let halo = px(&frame, 100.0, 104.0);
    assert!(halo[3] > 0 && halo[3] < 255);
    // First headline block sits just above its baseline.
    assert_eq!(px(&frame, 62.0, l.baselines[0] - 5.0), [255, 255, 255, 255]);
}

#[test]
fn follow_up_cards_skip_badge_and_mark() {
    for t in TemplateId::ALL {
        let (frame, _) = render(t, AspectRatio::Square, true);
        assert_eq!(px(&frame, 100.0, 80.0)[3], 0, "{t} drew a mark");
        assert!(
            frame.data.chunks_exact(4).all(|p| p != BADGE_BLUE),
            "{t} drew a badge"
        );
    }
}

#[test]
fn modern_center_restores_left_alignment() {
    let (frame, align) = render(TemplateId::ModernCenter, AspectRatio::Portrait, false);
    assert_eq!(align, TextAlign::Left);
    // Badge is centered horizontally.
    let l = ModernCenterLayout::compute(
        CanvasDimensions::for_aspect(AspectRatio::Portrait),
        AspectRatio::Portrait,
        0.25,
        9.0 * 18.5,
        3,
        false,
    );
    let badge = l.badge.unwrap();
    assert_eq!(px(&frame, badge.x0 + 2.0, badge.y0 + 2.0), BADGE_BLUE);
    assert_eq!(px(&frame, badge.x1 + 2.0, badge.y0 + 2.0)[3], 0);
}

#[test]
fn minimal_top_draws_accent_bar() {
    let (frame, _) = render(TemplateId::MinimalTop, AspectRatio::Landscape, false);
    let dims = CanvasDimensions::for_aspect(AspectRatio::Landscape);
    let l = MinimalTopLayout::compute(dims, AspectRatio::Landscape, 0.25, 3, false);
    let c = l.accent.center();
    assert_eq!(px(&frame, c.x, c.y), [0xe1, 0xb2, 0x50, 0xff]);
}

#[test]
fn rendering_is_pixel_deterministic() {
    for t in [TemplateId::Classic, TemplateId::MinimalTop] {
        let (a, _) = render(t, AspectRatio::Square, false);
        let (b, _) = render(t, AspectRatio::Square, false);
        assert!(a.data == b.data, "{t} differs between runs");
    }
}
