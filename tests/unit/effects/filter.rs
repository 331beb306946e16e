use super::*;

fn shadow(angle: f64, distance: f64) -> DropShadowFilter {
    DropShadowFilter {
        blur_x: 4.0,
        blur_y: 4.0,
        angle,
        distance,
        color: 0x000000,
        alpha: 1.0,
        quality: 3,
    }
}

#[test]
fn quality_zero_never_blurs() {
    for ratio in [0.5, 1.0, 2.0, 3.0] {
        for (bx, by) in [(0.0, 0.0), (4.0, 8.0), (100.0, 1.0)] {
            assert_eq!(std_deviation(ratio, bx, by, 0), (0.0, 0.0));
        }
    }
}

#[test]
fn quality_three_scales_linearly_with_ratio() {
    let (x1, y1) = std_deviation(1.0, 8.0, 4.0, 3);
    let (x2, y2) = std_deviation(2.0, 8.0, 4.0, 3);
    assert_eq!((x1, y1), (4.0, 2.0));
    assert_eq!((x2, y2), (8.0, 4.0));
}

#[test]
fn quality_table_matches_box_pass_approximations() {
    assert!((quality_factor(1.0, 1) - 0.5 / 2.7).abs() < 1e-12);
    assert!((quality_factor(1.0, 2) - 0.5 / 1.28).abs() < 1e-12);
    assert_eq!(quality_factor(1.0, 7), quality_factor(1.0, 3));
}

#[test]
fn drop_shadow_offset_follows_angle() {
    let (dx, dy) = shadow(0.0, 10.0).offset(1.0);
    assert!((dx - 10.0).abs() < 1e-9);
    assert!(dy.abs() < 1e-9);

    let (dx, dy) = shadow(90.0, 10.0).offset(1.0);
    assert!(dx.abs() < 1e-9);
    assert!((dy - 10.0).abs() < 1e-9);

    let (dx, _) = shadow(0.0, 10.0).offset(2.0);
    assert!((dx - 20.0).abs() < 1e-9);
}

#[test]
fn flood_color_is_rgba_hex() {
    let mut s = shadow(45.0, 4.0);
    s.color = 0xff8000;
    s.alpha = 0.5;
    assert_eq!(s.flood_color(), "#ff800080");
    s.alpha = 3.0;
    s.color = 0x1234_5678;
    assert_eq!(s.flood_color(), "#345678ff");
}

#[test]
fn filters_roundtrip_through_json() {
    let f = Filter::Blur(BlurFilter {
        blur_x: 2.0,
        blur_y: 3.0,
        quality: 1,
    });
    let json = serde_json::to_string(&f).unwrap();
    let back: Filter = serde_json::from_str(&json).unwrap();
    assert_eq!(back, f);
}
