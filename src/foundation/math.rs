pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Smallest power of two >= `v` (1 for 0).
pub(crate) fn next_pow2(v: u32) -> u32 {
    v.max(1).checked_next_power_of_two().unwrap_or(u32::MAX)
}

pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn u8_to_unit(v: u8) -> f32 {
    f32::from(v) / 255.0
}

/// Premultiplied RGBA8 to straight RGBA in `[0, 1]`.
pub(crate) fn unpremultiply(px: [u8; 4]) -> [f32; 4] {
    let a = u8_to_unit(px[3]);
    if a <= 0.0 {
        return [0.0; 4];
    }
    [
        (u8_to_unit(px[0]) / a).min(1.0),
        (u8_to_unit(px[1]) / a).min(1.0),
        (u8_to_unit(px[2]) / a).min(1.0),
        a,
    ]
}

/// Straight RGBA in `[0, 1]` to premultiplied RGBA8.
pub(crate) fn premultiply(rgba: [f32; 4]) -> [u8; 4] {
    let a = rgba[3].clamp(0.0, 1.0);
    [
        unit_to_u8(rgba[0].clamp(0.0, 1.0) * a),
        unit_to_u8(rgba[1].clamp(0.0, 1.0) * a),
        unit_to_u8(rgba[2].clamp(0.0, 1.0) * a),
        unit_to_u8(a),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
