use std::io::Cursor;

use chrono::NaiveDate;

use super::*;
use crate::config::FixedClock;
use crate::encode::jpeg::OutputFormat;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(w, h, |x, _| image::Rgba([(x % 256) as u8, 90, 60, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn engine(output: OutputFormat) -> PosterEngine {
    let config = EngineConfig {
        output,
        ..EngineConfig::default()
    };
    PosterEngine::builder()
        .config(config)
        .typesetter_source(Arc::new(FixedAdvanceTypesetter::new(0.5)))
        .clock(Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap())))
        .build()
        .unwrap()
}

fn options(engine: &PosterEngine) -> RenderOptions {
    let uri = engine.blobs().insert(png_bytes(64, 36)).unwrap();
    RenderOptions::new(uri, "Short headline", "Sport")
}

#[tokio::test]
async fn renders_square_jpeg() {
    let engine = engine(OutputFormat::default());
    let poster = engine.render(&options(&engine)).await.unwrap();
    assert_eq!(poster.mime, "image/jpeg");
    assert_eq!((poster.width, poster.height), (1080, 1080));
    let decoded = image::load_from_memory(&poster.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1080, 1080));
}

#[tokio::test]
async fn landscape_keeps_logical_height_and_floors_raster() {
    let engine = engine(OutputFormat::Png);
    let opts = options(&engine).with_aspect_ratio(AspectRatio::Landscape);
    let poster = engine.render(&opts).await.unwrap();
    assert_eq!(poster.dimensions.height, 607.5);
    assert_eq!((poster.width, poster.height), (1080, 607));
}

#[tokio::test]
async fn every_template_renders() {
    let engine = engine(OutputFormat::Png);
    for template in TemplateId::ALL {
        for aspect in AspectRatio::ALL {
            let opts = options(&engine)
                .with_template(template)
                .with_aspect_ratio(aspect);
            let poster = engine.render(&opts).await.unwrap();
            assert_eq!(poster.dimensions, CanvasDimensions::for_aspect(aspect));
        }
    }
}

#[tokio::test]
async fn identical_inputs_render_identical_bytes() {
    let engine = engine(OutputFormat::Png);
    let opts = options(&engine).with_template(TemplateId::ModernCenter);
    let a = engine.render(&opts).await.unwrap();
    let b = engine.render(&opts).await.unwrap();
    assert!(a.bytes == b.bytes);
}

#[tokio::test]
async fn empty_title_and_category_are_accepted() {
    let engine = engine(OutputFormat::Png);
    let mut opts = options(&engine);
    opts.title.clear();
    opts.category.clear();
    engine.render(&opts).await.unwrap();
}

#[tokio::test]
async fn carousel_cards_come_back_in_order() {
    let engine = engine(OutputFormat::Png);
    let uri = engine.blobs().insert(png_bytes(40, 40)).unwrap();
    let plan = CarouselPlan {
        image_source: uri,
        title: "Hero".to_string(),
        category: "NEWS".to_string(),
        descriptions: vec!["One".to_string(), "Two".to_string()],
        card_count: 3,
        aspect_ratio: AspectRatio::Portrait,
        template: None,
    };
    let posters = engine.render_carousel(&plan).await.unwrap();
    assert_eq!(posters.len(), 3);
    for (poster, card) in posters.iter().zip(plan.cards()) {
        let single = engine.render(&card).await.unwrap();
        assert!(poster.bytes == single.bytes);
    }
}

#[test]
fn builder_defaults_template_from_config() {
    let config = EngineConfig {
        default_template: TemplateId::MinimalTop,
        ..EngineConfig::default()
    };
    let engine = PosterEngine::builder()
        .config(config.clone())
        .typesetter_source(Arc::new(FixedAdvanceTypesetter::default()))
        .build()
        .unwrap();
    assert_eq!(engine.default_template(), TemplateId::MinimalTop);

    let engine = PosterEngine::builder()
        .config(config)
        .default_template(TemplateId::ModernCenter)
        .typesetter_source(Arc::new(FixedAdvanceTypesetter::default()))
        .build()
        .unwrap();
    assert_eq!(engine.default_template(), TemplateId::ModernCenter);
    assert!(engine.blobs().get(WHITE_MARK_URI).is_some());
}

#[test]
fn builder_rejects_bad_config() {
    let mut config = EngineConfig::default();
    config.brand.badge_color = "#zzzzzz".to_string();
    assert!(PosterEngine::builder().config(config).build().is_err());
}

#[test]
fn render_options_use_camel_case() {
    let opts: RenderOptions = serde_json::from_str(
        r#"{ "imageSource": "mem:1", "title": "T", "category": "C", "aspectRatio": "4:5", "template": "modern-center", "isFollowUp": true }"#,
    )
    .unwrap();
    assert_eq!(opts.aspect_ratio, AspectRatio::Portrait);
    assert_eq!(opts.template, Some(TemplateId::ModernCenter));
    assert!(opts.is_follow_up);

    let minimal: RenderOptions =
        serde_json::from_str(r#"{ "imageUrl": "mem:2", "title": "T" }"#).unwrap();
    assert_eq!(minimal, RenderOptions::new("mem:2", "T", ""));
    let json = serde_json::to_value(&minimal).unwrap();
    assert!(json.get("template").is_none());
    assert_eq!(json["aspectRatio"], "1:1");
}

fn solid_png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[tokio::test]
async fn backgrounds_wider_than_a_pixmap_still_render() {
    let engine = engine(OutputFormat::Png);
    let uri = engine.blobs().insert(solid_png(70_000, 20, [30, 140, 70, 255])).unwrap();
    let poster = engine
        .render(&RenderOptions::new(uri, "Wide", "Panorama"))
        .await
        .unwrap();
    assert_eq!((poster.width, poster.height), (1080, 1080));

    let img = image::load_from_memory(&poster.bytes).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(1070, 10).0, [30, 140, 70, 255]);
}

#[tokio::test]
async fn each_template_loads_its_configured_mark() {
    let mark = |fill: &str| {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="80"><rect width="200" height="80" fill="{fill}"/></svg>"##
        )
        .into_bytes()
    };
    let blobs = BlobStore::new();
    blobs.insert_named("mem:test/standard", mark("#ff0000")).unwrap();
    blobs.insert_named("mem:test/white", mark("#00ff00")).unwrap();
    let mut config = EngineConfig {
        output: OutputFormat::Png,
        ..EngineConfig::default()
    };
    config.brand.standard_mark = "mem:test/standard".to_string();
    config.brand.white_mark = "mem:test/white".to_string();
    let engine = PosterEngine::builder()
        .config(config)
        .blobs(blobs)
        .typesetter_source(Arc::new(FixedAdvanceTypesetter::new(0.5)))
        .clock(Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap())))
        .build()
        .unwrap();
    let uri = engine.blobs().insert(png_bytes(64, 64)).unwrap();

    // Points inside each template's mark rectangle on a 1080 square.
    let cases = [
        (TemplateId::Classic, (80, 80), [255, 0, 0, 255]),
        (TemplateId::ModernCenter, (540, 126), [0, 255, 0, 255]),
        (TemplateId::MinimalTop, (80, 80), [255, 0, 0, 255]),
    ];
    for (template, (x, y), expected) in cases {
        let opts = RenderOptions::new(uri.clone(), "Headline", "Sport").with_template(template);
        let poster = engine.render(&opts).await.unwrap();
        let img = image::load_from_memory(&poster.bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(x, y).0, expected, "{template}");
    }
}
