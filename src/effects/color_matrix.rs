use std::fmt::Write as _;

/// 4x5 affine color transform over straight (non-premultiplied) RGBA, row-major.
///
/// Row `i` computes channel `i` as `m[i*5]*R + m[i*5+1]*G + m[i*5+2]*B + m[i*5+3]*A + m[i*5+4]`,
/// with channels in `[0, 255]` so the offset column is in 8-bit units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorMatrix(pub [f32; 20]);

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    const ALPHA_MULTIPLIER: usize = 18;

    /// Matrix that only scales alpha by `k`.
    pub fn alpha(k: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.0[Self::ALPHA_MULTIPLIER] = k;
        m
    }

    /// Per-channel multiplier + offset transform (offsets in 8-bit units).
    pub fn from_multipliers(multipliers: [f32; 4], offsets: [f32; 4]) -> Self {
        let mut m = [0.0f32; 20];
        for i in 0..4 {
            m[i * 5 + i] = multipliers[i];
            m[i * 5 + 4] = offsets[i];
        }
        Self(m)
    }

    pub fn is_identity(&self) -> bool {
        self.0 == Self::IDENTITY.0
    }

    /// The alpha multiplier, when it is the only entry that differs from identity.
    pub fn alpha_multiplier(&self) -> Option<f32> {
        let only_alpha = self
            .0
            .iter()
            .zip(Self::IDENTITY.0.iter())
            .enumerate()
            .all(|(i, (v, id))| i == Self::ALPHA_MULTIPLIER || v == id);
        only_alpha.then_some(self.0[Self::ALPHA_MULTIPLIER])
    }

    pub fn has_only_alpha_multiplier(&self) -> bool {
        self.alpha_multiplier().is_some()
    }

    /// Serializes into a filter-graph color-matrix parameter: 20 space-separated values,
    /// row-major, offsets normalized to `[0, 1]` channel units.
    pub fn to_filter_values(&self) -> String {
        let mut out = String::with_capacity(20 * 4);
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let v = if i % 5 == 4 { v / 255.0 } else { *v };
            let _ = write!(out, "{v}");
        }
        out
    }

    /// Parses a parameter string produced by [`ColorMatrix::to_filter_values`].
    pub fn from_filter_values(values: &str) -> Option<Self> {
        let mut m = [0.0f32; 20];
        let mut n = 0usize;
        for tok in values.split(|c: char| c.is_ascii_whitespace() || c == ',') {
            if tok.is_empty() {
                continue;
            }
            if n == 20 {
                return None;
            }
            let v: f32 = tok.parse().ok()?;
            m[n] = if n % 5 == 4 { v * 255.0 } else { v };
            n += 1;
        }
        (n == 20).then_some(Self(m))
    }

    /// Applies the transform to a straight RGBA color in `[0, 1]`.
    pub fn apply_unit(&self, rgba: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let mut out = [0.0f32; 4];
        for (i, o) in out.iter_mut().enumerate() {
            let row = &m[i * 5..i * 5 + 5];
            let v = row[0] * rgba[0]
                + row[1] * rgba[1]
                + row[2] * rgba[2]
                + row[3] * rgba[3]
                + row[4] / 255.0;
            *o = v.clamp(0.0, 1.0);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color_matrix.rs"]
mod tests;
