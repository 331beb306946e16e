use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn destination_in_keeps_dst_scaled_by_src_alpha() {
    let dst = [200, 100, 50, 255];
    assert_eq!(
        composite(CompositeOperator::DestinationIn, dst, [0, 0, 0, 255], 1.0),
        dst
    );
    assert_eq!(
        composite(CompositeOperator::DestinationIn, dst, [0, 0, 0, 0], 1.0),
        [0, 0, 0, 0]
    );
    assert_eq!(
        composite(CompositeOperator::DestinationIn, dst, [9, 9, 9, 128], 1.0),
        [100, 50, 25, 128]
    );
}

#[test]
fn destination_out_is_complement_of_destination_in() {
    let dst = [200, 100, 50, 255];
    assert_eq!(
        composite(CompositeOperator::DestinationOut, dst, [0, 0, 0, 255], 1.0),
        [0, 0, 0, 0]
    );
    assert_eq!(
        composite(CompositeOperator::DestinationOut, dst, [0, 0, 0, 0], 1.0),
        dst
    );
}

#[test]
fn multiply_of_opaque_white_is_identity() {
    let dst = [30, 60, 90, 255];
    assert_eq!(
        composite(CompositeOperator::Multiply, dst, [255, 255, 255, 255], 1.0),
        dst
    );
}

#[test]
fn screen_of_opaque_black_is_identity() {
    let dst = [30, 60, 90, 255];
    assert_eq!(
        composite(CompositeOperator::Screen, dst, [0, 0, 0, 255], 1.0),
        dst
    );
}

#[test]
fn difference_of_equal_opaque_colors_is_black() {
    let px = [120, 33, 250, 255];
    assert_eq!(
        composite(CompositeOperator::Difference, px, px, 1.0),
        [0, 0, 0, 255]
    );
}

#[test]
fn separable_modes_onto_transparent_behave_like_over() {
    let src = [40, 80, 120, 200];
    for op in [
        CompositeOperator::Multiply,
        CompositeOperator::Screen,
        CompositeOperator::Lighten,
        CompositeOperator::Darken,
        CompositeOperator::Overlay,
        CompositeOperator::HardLight,
    ] {
        assert_eq!(composite(op, [0, 0, 0, 0], src, 1.0), src, "{op}");
    }
}

#[test]
fn composite_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    let src = vec![0u8; 4];
    assert!(composite_in_place(CompositeOperator::SourceOver, &mut dst, &src, 1.0).is_err());
}
