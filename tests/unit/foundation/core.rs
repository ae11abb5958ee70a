use super::*;

#[test]
fn hex_colors_parse() {
    assert_eq!(Rgba8::from_hex("#0070c0").unwrap(), Rgba8::rgb(0x00, 0x70, 0xc0));
    assert_eq!(
        Rgba8::from_hex("#e1b25080").unwrap(),
        Rgba8 {
            r: 0xe1,
            g: 0xb2,
            b: 0x50,
            a: 0x80
        }
    );
    assert!(Rgba8::from_hex("0070c0").is_err());
    assert!(Rgba8::from_hex("#0070c").is_err());
    assert!(Rgba8::from_hex("#zz70c0").is_err());
}

#[test]
fn css_alpha_fraction_rounds() {
    assert_eq!(Rgba8::BLACK.with_alpha_f32(0.4).a, 102);
    assert_eq!(Rgba8::WHITE.with_alpha_f32(0.3).a, 77);
    assert_eq!(Rgba8::WHITE.with_alpha_f32(2.0).a, 255);
}

#[test]
fn premul_rounds() {
    let p = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
    assert_eq!(p.g, 64);
    assert_eq!(p.b, 0);
    assert_eq!(Rgba8::rgb(1, 2, 3).with_alpha_f32(0.0).premultiplied(), Rgba8Premul::transparent());
}
