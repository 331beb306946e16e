use crate::foundation::error::{TesseraError, TesseraResult};

/// Kernel half-width for a gaussian of the given deviation (3 sigma, at least 1 px).
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    ((sigma * 3.0).ceil() as u32).max(1)
}

/// Separable gaussian blur over a premultiplied RGBA8 buffer with independent x/y deviations.
///
/// A deviation of zero leaves that axis untouched. Edges clamp.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    sigma_x: f32,
    sigma_y: f32,
) -> TesseraResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| TesseraError::evaluation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(TesseraError::evaluation(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if sigma_x.is_nan() || sigma_y.is_nan() || sigma_x < 0.0 || sigma_y < 0.0 {
        return Err(TesseraError::validation("blur deviation must be >= 0"));
    }

    let rx = radius_for_sigma(sigma_x);
    let ry = radius_for_sigma(sigma_y);
    if (rx == 0 && ry == 0) || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let mut out = src.to_vec();
    if rx > 0 {
        let kernel = gaussian_kernel_q16(rx, sigma_x)?;
        let mut tmp = vec![0u8; expected_len];
        horizontal_pass(&out, &mut tmp, width, height, &kernel);
        out = tmp;
    }
    if ry > 0 {
        let kernel = gaussian_kernel_q16(ry, sigma_y)?;
        let mut tmp = vec![0u8; expected_len];
        vertical_pass(&out, &mut tmp, width, height, &kernel);
        out = tmp;
    }
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> TesseraResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(TesseraError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(TesseraError::evaluation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Rounding drift goes to the center tap so the kernel sums to exactly 1.0 in Q16.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
