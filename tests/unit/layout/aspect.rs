use super::*;

#[test]
fn stories_win_over_everything() {
    assert_eq!(best_aspect_ratio(&["instagram_stories"]), AspectRatio::Story);
    assert_eq!(
        best_aspect_ratio(&["twitter", "facebook", "Story"]),
        AspectRatio::Story
    );
}

#[test]
fn feed_platforms_beat_landscape_platforms() {
    assert_eq!(best_aspect_ratio(&["twitter", "facebook"]), AspectRatio::Portrait);
    assert_eq!(best_aspect_ratio(&["Instagram", "youtube"]), AspectRatio::Portrait);
}

#[test]
fn landscape_platforms_and_default() {
    for p in ["twitter", "X", "youtube", "LinkedIn"] {
        assert_eq!(best_aspect_ratio(&[p]), AspectRatio::Landscape, "{p}");
    }
    assert_eq!(best_aspect_ratio(&["tiktok"]), AspectRatio::Square);
    let none: [&str; 0] = [];
    assert_eq!(best_aspect_ratio(&none), AspectRatio::Square);
}

#[test]
fn selector_is_deterministic() {
    let platforms = vec!["linkedin".to_string(), "pinterest".to_string()];
    let a = best_aspect_ratio(&platforms);
    let b = best_aspect_ratio(&platforms);
    assert_eq!(a, b);
}

#[test]
fn dimensions_match_nominal_table() {
    let d = |a| CanvasDimensions::for_aspect(a);
    assert_eq!(d(AspectRatio::Square).height, 1080.0);
    assert_eq!(d(AspectRatio::Portrait).height, 1350.0);
    assert_eq!(d(AspectRatio::Landscape).height, 607.5);
    assert_eq!(d(AspectRatio::Story).height, 1920.0);
    for a in AspectRatio::ALL {
        assert_eq!(d(a).width, 1080.0);
    }
}

#[test]
fn fractional_height_floors_for_raster() {
    let dims = CanvasDimensions::for_aspect(AspectRatio::Landscape);
    assert_eq!(dims.pixel_width(), 1080);
    assert_eq!(dims.pixel_height(), 607);
}

#[test]
fn aspect_parses_and_serializes_as_ratio_notation() {
    assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
    assert!("3:2".parse::<AspectRatio>().is_err());
    assert_eq!(
        serde_json::to_string(&AspectRatio::Portrait).unwrap(),
        "\"4:5\""
    );
    let a: AspectRatio = serde_json::from_str("\"9:16\"").unwrap();
    assert_eq!(a, AspectRatio::Story);
    assert_eq!(AspectRatio::Landscape.max_title_lines(), 2);
    assert_eq!(AspectRatio::Story.max_title_lines(), 4);
}
