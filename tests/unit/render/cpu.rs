use super::*;
use crate::render::backend::{FilterAttribute, FilterGraphHost, FilterPrimitive};
use crate::render::cpu_filter::CpuFilterHost;

const RED: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};
const BLUE: Rgba8Premul = Rgba8Premul {
    r: 0,
    g: 0,
    b: 255,
    a: 255,
};

#[test]
fn new_surface_is_transparent() {
    let s = CpuSurface::new(4, 4).unwrap();
    assert!(s.data().iter().all(|&b| b == 0));
    assert_eq!((s.width(), s.height()), (4, 4));
}

#[test]
fn oversized_surface_is_rejected() {
    assert!(CpuSurface::new(70_000, 1).is_err());
}

#[test]
fn fill_and_clear_respect_rect() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    s.fill_rect(Region::new(1, 1, 2, 2), RED);
    assert_eq!(s.pixel(1, 1), Some(RED));
    assert_eq!(s.pixel(0, 0), Some(Rgba8Premul::transparent()));
    s.clear_rect(Region::new(1, 1, 1, 1));
    assert_eq!(s.pixel(1, 1), Some(Rgba8Premul::transparent()));
    assert_eq!(s.pixel(2, 2), Some(RED));
}

#[test]
fn fill_honors_translation() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    s.set_transform(Affine::translate((2.0, 1.0)));
    s.fill_rect(Region::new(0, 0, 1, 1), RED);
    assert_eq!(s.pixel(2, 1), Some(RED));
    assert_eq!(s.pixel(0, 0), Some(Rgba8Premul::transparent()));
}

#[test]
fn draw_image_copies_and_clips() {
    let mut src = CpuSurface::new(2, 2).unwrap();
    src.fill_rect(Region::new(0, 0, 2, 2), BLUE);
    let mut dst = CpuSurface::new(3, 3).unwrap();
    dst.draw_image(&src, Region::new(0, 0, 2, 2), Region::new(2, 2, 2, 2))
        .unwrap();
    assert_eq!(dst.pixel(2, 2), Some(BLUE));
    assert_eq!(dst.pixel(1, 1), Some(Rgba8Premul::transparent()));
}

#[test]
fn draw_image_uses_global_alpha_and_operator() {
    let mut src = CpuSurface::new(1, 1).unwrap();
    src.fill_rect(Region::new(0, 0, 1, 1), RED);
    let mut dst = CpuSurface::new(1, 1).unwrap();
    dst.fill_rect(Region::new(0, 0, 1, 1), BLUE);

    dst.set_global_alpha(0.0);
    dst.draw_image(&src, Region::new(0, 0, 1, 1), Region::new(0, 0, 1, 1))
        .unwrap();
    assert_eq!(dst.pixel(0, 0), Some(BLUE));

    dst.set_global_alpha(1.0);
    dst.set_composite_operator(CompositeOperator::DestinationOut);
    dst.draw_image(&src, Region::new(0, 0, 1, 1), Region::new(0, 0, 1, 1))
        .unwrap();
    assert_eq!(dst.pixel(0, 0), Some(Rgba8Premul::transparent()));
}

#[test]
fn color_matrix_override_applies_per_pixel() {
    let mut src = CpuSurface::new(1, 1).unwrap();
    src.fill_rect(Region::new(0, 0, 1, 1), RED);
    let mut dst = CpuSurface::new(1, 1).unwrap();
    dst.set_color_matrix_override(Some(ColorMatrix::from_multipliers(
        [0.0, 1.0, 1.0, 1.0],
        [0.0, 255.0, 0.0, 0.0],
    )));
    dst.draw_image(&src, Region::new(0, 0, 1, 1), Region::new(0, 0, 1, 1))
        .unwrap();
    assert_eq!(dst.pixel(0, 0).unwrap().to_array(), [0, 255, 0, 255]);
}

#[test]
fn attached_filter_graph_runs_on_draw() {
    let mut host = CpuFilterHost::new();
    let root = host.create_node(FilterPrimitive::Filter).unwrap();
    let offset = host.create_node(FilterPrimitive::Offset).unwrap();
    host.set_attribute(&offset, FilterAttribute::Offset { dx: 1.0, dy: 0.0 })
        .unwrap();
    host.append_child(&root, &offset).unwrap();

    let mut src = CpuSurface::new(2, 1).unwrap();
    src.put_pixel(0, 0, RED);
    let mut dst = CpuSurface::new(2, 1).unwrap();
    dst.set_filter(Some(root));
    dst.draw_image(&src, Region::new(0, 0, 2, 1), Region::new(0, 0, 2, 1))
        .unwrap();
    assert_eq!(dst.pixel(0, 0), Some(Rgba8Premul::transparent()));
    assert_eq!(dst.pixel(1, 0), Some(RED));
}

#[test]
fn rgba_image_export_unpremultiplies() {
    let mut s = CpuSurface::new(1, 1).unwrap();
    s.put_pixel(0, 0, Rgba8Premul::from_straight_rgba(255, 0, 0, 128));
    let img = s.to_rgba_image();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 128]);

    let back = CpuSurface::from_rgba_image(&img).unwrap();
    assert_eq!(back.pixel(0, 0), s.pixel(0, 0));
}

#[test]
fn region_read_write_roundtrip_clips_outside() {
    let mut s = CpuSurface::new(2, 2).unwrap();
    s.write_region(Region::new(1, 1, 2, 1), &[1, 2, 3, 4, 5, 6, 7, 8])
        .unwrap();
    assert_eq!(s.pixel(1, 1).unwrap().to_array(), [1, 2, 3, 4]);
    assert_eq!(
        s.read_region(Region::new(1, 1, 2, 1)),
        vec![1, 2, 3, 4, 0, 0, 0, 0]
    );
    assert!(s.write_region(Region::new(0, 0, 1, 1), &[0; 8]).is_err());
}

#[test]
fn empty_write_region_is_a_no_op() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    s.write_region(Region::new(0, 0, 0, 3), &[]).unwrap();
    s.write_region(Region::new(1, 1, 3, 0), &[]).unwrap();
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn wide_rect_pixels_land_row_major() {
    let mut s = CpuSurface::new(300, 2).unwrap();
    s.put_pixel(299, 1, RED);
    s.put_pixel(0, 1, BLUE);
    let px = s.read_region(Region::new(0, 0, 300, 2));
    let at = |x: usize, y: usize| &px[(y * 300 + x) * 4..(y * 300 + x) * 4 + 4];
    assert_eq!(at(299, 1), &RED.to_array());
    assert_eq!(at(0, 1), &BLUE.to_array());

    let mut dst = CpuSurface::new(300, 2).unwrap();
    dst.draw_image(&s, Region::new(0, 0, 300, 2), Region::new(0, 0, 300, 2))
        .unwrap();
    assert_eq!(dst.pixel(299, 1), Some(RED));
    assert_eq!(dst.pixel(0, 1), Some(BLUE));
}
