use crate::effects::blend::CompositeOperator;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composites one premultiplied source pixel onto `dst` with the given native operator.
///
/// `opacity` is the surface's global alpha and scales the source before the operator runs.
pub fn composite(
    op: CompositeOperator,
    dst: PremulRgba8,
    src: PremulRgba8,
    opacity: f32,
) -> PremulRgba8 {
    match op {
        CompositeOperator::SourceOver => over(dst, src, opacity),
        CompositeOperator::DestinationIn => {
            let sa = scaled_alpha(src, opacity);
            dst.map(|c| mul_div255_u8(u16::from(c), sa))
        }
        CompositeOperator::DestinationOut => {
            let inv = 255 - scaled_alpha(src, opacity);
            dst.map(|c| mul_div255_u8(u16::from(c), inv))
        }
        CompositeOperator::Multiply
        | CompositeOperator::Screen
        | CompositeOperator::Lighten
        | CompositeOperator::Darken
        | CompositeOperator::Difference
        | CompositeOperator::Overlay
        | CompositeOperator::HardLight => separable(op, dst, src, opacity),
    }
}

pub fn composite_in_place(
    op: CompositeOperator,
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
) -> TesseraResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TesseraError::evaluation(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = composite(op, [d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn scaled_alpha(src: PremulRgba8, opacity: f32) -> u16 {
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    u16::from(mul_div255_u8(u16::from(src[3]), op))
}

// Separable modes in premultiplied form:
// Co = Cs.(1 - Ab) + Cb.(1 - As) + As.Ab.B(Cb/Ab, Cs/As), Ao = As + Ab - As.Ab
fn separable(
    op: CompositeOperator,
    dst: PremulRgba8,
    src: PremulRgba8,
    opacity: f32,
) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    let s = src.map(|c| f32::from(c) / 255.0 * opacity);
    let d = dst.map(|c| f32::from(c) / 255.0);
    let (sa, da) = (s[3], d[3]);
    if sa <= 0.0 {
        return dst;
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let cs = s[i] / sa;
        let cb = if da > 0.0 { d[i] / da } else { 0.0 };
        let mixed = blend_channel(op, cb.min(1.0), cs.min(1.0));
        let co = s[i] * (1.0 - da) + d[i] * (1.0 - sa) + sa * da * mixed;
        out[i] = to_u8(co);
    }
    out[3] = to_u8(sa + da - sa * da);
    out
}

fn blend_channel(op: CompositeOperator, cb: f32, cs: f32) -> f32 {
    match op {
        CompositeOperator::Multiply => cb * cs,
        CompositeOperator::Screen => screen(cb, cs),
        CompositeOperator::Lighten => cb.max(cs),
        CompositeOperator::Darken => cb.min(cs),
        CompositeOperator::Difference => (cb - cs).abs(),
        CompositeOperator::Overlay => hard_light(cs, cb),
        CompositeOperator::HardLight => hard_light(cb, cs),
        _ => cs,
    }
}

fn screen(cb: f32, cs: f32) -> f32 {
    cb + cs - cb * cs
}

fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
