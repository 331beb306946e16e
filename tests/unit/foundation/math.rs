use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn next_pow2_rounds_up_and_keeps_exact_powers() {
    assert_eq!(next_pow2(0), 1);
    assert_eq!(next_pow2(1), 1);
    assert_eq!(next_pow2(3), 4);
    assert_eq!(next_pow2(64), 64);
    assert_eq!(next_pow2(65), 128);
}

#[test]
fn premultiply_undoes_unpremultiply_for_opaque_pixels() {
    let px = [10u8, 200, 77, 255];
    assert_eq!(premultiply(unpremultiply(px)), px);
}

#[test]
fn unpremultiply_transparent_is_zero() {
    assert_eq!(unpremultiply([5, 5, 5, 0]), [0.0; 4]);
}
