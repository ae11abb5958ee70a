use super::*;

fn frame(w: u32, h: u32, px: [u8; 4], premultiplied: bool) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied,
    }
}

fn dims(w: f64, h: f64) -> CanvasDimensions {
    CanvasDimensions {
        width: w,
        height: h,
    }
}

#[test]
fn quality_factor_maps_to_percent() {
    assert_eq!(jpeg_quality(0.9), 90);
    assert_eq!(jpeg_quality(1.0), 100);
    assert_eq!(jpeg_quality(0.0), 1);
    assert_eq!(jpeg_quality(f32::NAN), 90);
}

#[test]
fn jpeg_output_decodes_to_frame_size() {
    let f = frame(32, 17, [200, 40, 40, 255], true);
    let out = encode_frame(&f, OutputFormat::default(), dims(32.0, 17.5)).unwrap();
    assert_eq!(out.mime, "image/jpeg");
    assert_eq!(&out.bytes[..2], &[0xff, 0xd8]);
    assert_eq!((out.width, out.height), (32, 17));
    assert_eq!(out.dimensions.height, 17.5);

    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (32, 17));
    let p = decoded.get_pixel(16, 8);
    assert!(p[0] > 180 && p[1] < 70, "unexpected color {p:?}");
}

#[test]
fn transparent_pixels_flatten_to_black() {
    let f = frame(8, 8, [0, 0, 0, 0], true);
    let out = encode_frame(&f, OutputFormat::default(), dims(8.0, 8.0)).unwrap();
    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
    assert!(decoded.pixels().all(|p| p[0] < 8 && p[1] < 8 && p[2] < 8));
}

#[test]
fn png_round_trips_straight_alpha() {
    let f = frame(4, 4, [64, 32, 16, 128], true);
    let out = encode_frame(&f, OutputFormat::Png, dims(4.0, 4.0)).unwrap();
    assert_eq!(out.mime, "image/png");
    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(1, 1).0, [128, 64, 32, 128]);
}

#[test]
fn zero_dimension_frame_is_an_encode_error() {
    let f = FrameRGBA {
        width: 0,
        height: 10,
        data: Vec::new(),
        premultiplied: true,
    };
    let err = encode_frame(&f, OutputFormat::default(), dims(0.0, 10.0)).unwrap_err();
    assert!(matches!(err, PosterError::Encode(_)));
}

#[test]
fn short_frame_data_is_an_encode_error() {
    let mut f = frame(4, 4, [0, 0, 0, 255], true);
    f.data.truncate(10);
    assert!(matches!(
        encode_frame(&f, OutputFormat::Png, dims(4.0, 4.0)),
        Err(PosterError::Encode(_))
    ));
}

#[test]
fn format_metadata() {
    assert_eq!(OutputFormat::Png.extension(), "png");
    assert_eq!(OutputFormat::default().extension(), "jpg");
    let json = serde_json::to_string(&OutputFormat::default()).unwrap();
    assert_eq!(json, r#"{"format":"jpeg","quality":0.9}"#);
}
