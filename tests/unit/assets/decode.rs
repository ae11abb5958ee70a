use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

const SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="50"><rect width="200" height="50" fill="#ffffff"/></svg>"##;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);
    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_image(b"not an image").is_err());
    assert!(decode_asset(b"not an image").is_err());
}

#[test]
fn decode_svg_parse_ok_and_err() {
    parse_svg(SVG).unwrap();
    assert!(parse_svg(br#"<svg"#).is_err());
}

#[test]
fn decode_asset_sniffs_markup() {
    let svg = decode_asset(SVG).unwrap();
    assert!(matches!(svg, AssetHandle::Vector(_)));
    assert_eq!(svg.natural_size(), (200.0, 50.0));
    assert_eq!(svg.height_for_width(400.0), 100.0);

    let xml = [b"<?xml version=\"1.0\"?>\n".as_slice(), SVG].concat();
    assert!(matches!(decode_asset(&xml).unwrap(), AssetHandle::Vector(_)));

    let png = decode_asset(&png_bytes(4, 2, [0, 0, 0, 255])).unwrap();
    assert!(matches!(png, AssetHandle::Raster(_)));
    assert_eq!(png.natural_size(), (4.0, 2.0));
}

#[test]
fn vector_rasterizes_at_draw_size() {
    let svg = decode_asset(SVG).unwrap();
    let px = svg.pixels_for(162.0, 40.5).unwrap();
    assert_eq!((px.width, px.height), (162, 41));
    assert_eq!(px.rgba8_premul.len(), 162 * 41 * 4);
    assert_eq!(&px.rgba8_premul[..4], &[255, 255, 255, 255]);
}

#[test]
fn raster_pixels_are_passed_through() {
    let png = decode_asset(&png_bytes(3, 3, [10, 20, 30, 255])).unwrap();
    let px = png.pixels_for(300.0, 300.0).unwrap();
    assert_eq!((px.width, px.height), (3, 3));
}

#[test]
fn large_rasters_shrink_to_their_draw_size() {
    let png = decode_asset(&png_bytes(400, 200, [10, 20, 30, 255])).unwrap();
    let px = png.pixels_for(100.0, 50.0).unwrap();
    assert_eq!((px.width, px.height), (100, 50));
    assert_eq!(&px.rgba8_premul[..4], &[10, 20, 30, 255]);
}

fn covers(dest: Rect, canvas: CanvasDimensions) -> bool {
    const EPS: f64 = 1e-6;
    dest.x0 <= EPS
        && dest.y0 <= EPS
        && dest.x1 >= canvas.width - EPS
        && dest.y1 >= canvas.height - EPS
}

#[test]
fn cover_pixels_keep_only_the_visible_window() {
    let canvas = CanvasDimensions::for_aspect(crate::layout::aspect::AspectRatio::Square);
    let png = decode_asset(&png_bytes(70_000, 20, [10, 20, 30, 255])).unwrap();
    let (nw, nh) = png.natural_size();
    let fit = CoverFit::compute(nw, nh, canvas);

    let (px, dest) = png.cover_pixels(&fit, canvas).unwrap();
    assert!(px.width <= 22 && px.height == 20, "{}x{}", px.width, px.height);
    assert!(covers(dest, canvas), "{dest:?}");
    assert!(dest.width() < 2.0 * canvas.width);
}

#[test]
fn cover_pixels_downscale_large_photos() {
    let canvas = CanvasDimensions::for_aspect(crate::layout::aspect::AspectRatio::Square);
    let png = decode_asset(&png_bytes(4000, 3000, [10, 20, 30, 255])).unwrap();
    let (nw, nh) = png.natural_size();
    let fit = CoverFit::compute(nw, nh, canvas);

    let (px, dest) = png.cover_pixels(&fit, canvas).unwrap();
    assert!(px.width <= 1082 && px.height <= 1082, "{}x{}", px.width, px.height);
    assert!(covers(dest, canvas), "{dest:?}");
    assert!(dest.width() < canvas.width + 3.0);
}

#[test]
fn vector_backgrounds_rasterize_at_canvas_size() {
    let canvas = CanvasDimensions::for_aspect(crate::layout::aspect::AspectRatio::Landscape);
    let svg = decode_asset(SVG).unwrap();
    let (nw, nh) = svg.natural_size();
    let (px, dest) = svg
        .cover_pixels(&CoverFit::compute(nw, nh, canvas), canvas)
        .unwrap();
    assert_eq!((px.width, px.height), (1080, 607));
    assert_eq!(dest, Rect::new(0.0, 0.0, 1080.0, 607.0));
}
