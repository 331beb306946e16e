use crate::effects::color_matrix::ColorMatrix;

/// Highest filter quality level; larger values are clamped to it.
pub const MAX_QUALITY: u8 = 3;

/// Gaussian blur descriptor. `blur_x`/`blur_y` are in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlurFilter {
    pub blur_x: f64,
    pub blur_y: f64,
    pub quality: u8,
}

/// Drop shadow descriptor. `angle` is in degrees, `color` is `0xRRGGBB`, `alpha` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DropShadowFilter {
    pub blur_x: f64,
    pub blur_y: f64,
    pub angle: f64,
    pub distance: f64,
    pub color: u32,
    pub alpha: f64,
    pub quality: u8,
}

/// Structured visual effect attached to a draw call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Filter {
    Blur(BlurFilter),
    DropShadow(DropShadowFilter),
    ColorMatrix(ColorMatrix),
}

/// Scale applied to a blur amount to get a gaussian standard deviation.
///
/// Lower quality levels approximate the box-blur passes they stand for with a narrower gaussian.
pub fn quality_factor(ratio: f64, quality: u8) -> f64 {
    match quality.min(MAX_QUALITY) {
        0 => 0.0,
        1 => ratio / 2.0 / 2.7,
        2 => ratio / 2.0 / 1.28,
        _ => ratio / 2.0,
    }
}

/// Effective `(dx, dy)` standard deviation for a blur of `(blur_x, blur_y)`.
pub fn std_deviation(ratio: f64, blur_x: f64, blur_y: f64, quality: u8) -> (f64, f64) {
    let f = quality_factor(ratio, quality);
    (blur_x * f, blur_y * f)
}

impl BlurFilter {
    pub fn std_deviation(&self, ratio: f64) -> (f64, f64) {
        std_deviation(ratio, self.blur_x, self.blur_y, self.quality)
    }
}

impl DropShadowFilter {
    pub fn std_deviation(&self, ratio: f64) -> (f64, f64) {
        std_deviation(ratio, self.blur_x, self.blur_y, self.quality)
    }

    /// Shadow displacement in device pixels.
    pub fn offset(&self, ratio: f64) -> (f64, f64) {
        let rad = self.angle.to_radians();
        let d = self.distance * ratio;
        (d * rad.cos(), d * rad.sin())
    }

    /// Flood color as `#rrggbbaa`.
    pub fn flood_color(&self) -> String {
        let a = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:06x}{a:02x}", self.color & 0x00ff_ffff)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
