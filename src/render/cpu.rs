use crate::effects::blend::CompositeOperator;
use crate::effects::color_matrix::ColorMatrix;
use crate::effects::composite::composite;
use crate::foundation::core::{Affine, Region, Rgba8Premul};
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::math::{premultiply, unpremultiply};
use crate::render::backend::DrawingSurface;
use crate::render::cpu_filter::{self, CpuFilterNode};

/// Software reference drawing surface: premultiplied RGBA8 on a `vello_cpu::Pixmap`.
///
/// Honors the translation part of the transform only (rounded to whole pixels); draws with
/// mismatched source/destination sizes use nearest sampling. Composite operators act on the
/// destination rectangle only, and fills ignore the attached filter.
pub struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    transform: Affine,
    composite: CompositeOperator,
    global_alpha: f32,
    filter: Option<CpuFilterNode>,
    color_matrix: Option<ColorMatrix>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("composite", &self.composite)
            .field("global_alpha", &self.global_alpha)
            .field("filter", &self.filter.is_some())
            .field("color_matrix", &self.color_matrix.is_some())
            .finish()
    }
}

impl CpuSurface {
    pub fn new(width: u32, height: u32) -> TesseraResult<Self> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| TesseraError::validation("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| TesseraError::validation("surface height exceeds u16"))?;
        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        pixmap.data_as_u8_slice_mut().fill(0);
        Ok(Self {
            width: width_u16,
            height: height_u16,
            pixmap,
            transform: Affine::IDENTITY,
            composite: CompositeOperator::SourceOver,
            global_alpha: 1.0,
            filter: None,
            color_matrix: None,
        })
    }

    /// Builds a surface from straight-alpha RGBA pixels.
    pub fn from_rgba_image(img: &image::RgbaImage) -> TesseraResult<Self> {
        let mut surface = Self::new(img.width(), img.height())?;
        for (d, s) in surface
            .pixmap
            .data_as_u8_slice_mut()
            .chunks_exact_mut(4)
            .zip(img.as_raw().chunks_exact(4))
        {
            let px = Rgba8Premul::from_straight_rgba(s[0], s[1], s[2], s[3]);
            d.copy_from_slice(&px.to_array());
        }
        Ok(surface)
    }

    /// Straight-alpha copy of the pixels, for export or inspection.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut out = image::RgbaImage::new(u32::from(self.width), u32::from(self.height));
        for (d, s) in out.chunks_exact_mut(4).zip(self.data().chunks_exact(4)) {
            let [r, g, b, a] = unpremultiply([s[0], s[1], s[2], s[3]]);
            let px = [r, g, b, a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
            d.copy_from_slice(&px);
        }
        out
    }

    /// Premultiplied RGBA8, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        let idx = self.index(i64::from(x), i64::from(y))?;
        let d = self.data();
        Some(Rgba8Premul::from_array([d[idx], d[idx + 1], d[idx + 2], d[idx + 3]]))
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, px: Rgba8Premul) {
        if let Some(idx) = self.index(i64::from(x), i64::from(y)) {
            self.data_mut()[idx..idx + 4].copy_from_slice(&px.to_array());
        }
    }

    /// Copies `rect` out as a tightly packed buffer; pixels outside the surface read as
    /// transparent.
    pub fn read_region(&self, rect: Region) -> Vec<u8> {
        self.sample(rect, rect.w, rect.h)
    }

    pub fn write_region(&mut self, rect: Region, pixels: &[u8]) -> TesseraResult<()> {
        if pixels.len() as u64 != rect.area() * 4 {
            return Err(TesseraError::validation(
                "write_region expects pixels matching w*h*4",
            ));
        }
        if rect.is_empty() {
            return Ok(());
        }
        for (row, line) in pixels.chunks_exact((rect.w as usize) * 4).enumerate() {
            for (col, px) in line.chunks_exact(4).enumerate() {
                let x = i64::from(rect.x) + col as i64;
                let y = i64::from(rect.y) + row as i64;
                if let Some(idx) = self.index(x, y) {
                    self.data_mut()[idx..idx + 4].copy_from_slice(px);
                }
            }
        }
        Ok(())
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        if x < 0 || y < 0 || x >= w || y >= h {
            return None;
        }
        Some(((y * w + x) * 4) as usize)
    }

    // Nearest-neighbour read of `rect` resampled to `out_w` x `out_h`.
    fn sample(&self, rect: Region, out_w: u32, out_h: u32) -> Vec<u8> {
        let mut out = vec![0u8; (out_w as usize) * (out_h as usize) * 4];
        if rect.is_empty() {
            return out;
        }
        let data = self.data();
        for oy in 0..out_h {
            let sy = i64::from(rect.y) + i64::from(oy) * i64::from(rect.h) / i64::from(out_h);
            for ox in 0..out_w {
                let sx = i64::from(rect.x) + i64::from(ox) * i64::from(rect.w) / i64::from(out_w);
                if let Some(si) = self.index(sx, sy) {
                    let di = (oy as usize * out_w as usize + ox as usize) * 4;
                    out[di..di + 4].copy_from_slice(&data[si..si + 4]);
                }
            }
        }
        out
    }

    fn translation(&self) -> (i64, i64) {
        let t = self.transform.translation();
        (t.x.round() as i64, t.y.round() as i64)
    }

    // Calls `f(dst_index, local_index)` for every pixel of `rect` that lands on the surface
    // after translation.
    fn for_each_target(&self, rect: Region, mut f: impl FnMut(usize, usize)) {
        let (tx, ty) = self.translation();
        for ly in 0..rect.h {
            for lx in 0..rect.w {
                let x = i64::from(rect.x) + i64::from(lx) + tx;
                let y = i64::from(rect.y) + i64::from(ly) + ty;
                if let Some(di) = self.index(x, y) {
                    f(di, (ly as usize * rect.w as usize + lx as usize) * 4);
                }
            }
        }
    }
}

impl DrawingSurface for CpuSurface {
    type FilterNode = CpuFilterNode;

    fn width(&self) -> u32 {
        u32::from(self.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn offscreen(&self, width: u32, height: u32) -> TesseraResult<Self> {
        Self::new(width, height)
    }

    fn draw_image(&mut self, src: &Self, src_rect: Region, dst_rect: Region) -> TesseraResult<()> {
        if dst_rect.is_empty() {
            return Ok(());
        }
        let mut pixels = src.sample(src_rect, dst_rect.w, dst_rect.h);
        if let Some(m) = &self.color_matrix {
            cpu_filter::apply_color_matrix(&mut pixels, m);
        }
        if let Some(node) = &self.filter {
            pixels = cpu_filter::evaluate(node, &pixels, dst_rect.w, dst_rect.h)?;
        }

        let (op, alpha) = (self.composite, self.global_alpha);
        let mut writes = Vec::with_capacity(pixels.len() / 4);
        self.for_each_target(dst_rect, |di, si| writes.push((di, si)));
        let data = self.data_mut();
        for (di, si) in writes {
            let d = [data[di], data[di + 1], data[di + 2], data[di + 3]];
            let s = [pixels[si], pixels[si + 1], pixels[si + 2], pixels[si + 3]];
            data[di..di + 4].copy_from_slice(&composite(op, d, s, alpha));
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Region, color: Rgba8Premul) {
        let (op, alpha) = (self.composite, self.global_alpha);
        let src = match &self.color_matrix {
            Some(m) => premultiply(m.apply_unit(unpremultiply(color.to_array()))),
            None => color.to_array(),
        };
        let mut targets = Vec::new();
        self.for_each_target(rect, |di, _| targets.push(di));
        let data = self.data_mut();
        for di in targets {
            let d = [data[di], data[di + 1], data[di + 2], data[di + 3]];
            data[di..di + 4].copy_from_slice(&composite(op, d, src, alpha));
        }
    }

    fn clear_rect(&mut self, rect: Region) {
        let mut targets = Vec::new();
        self.for_each_target(rect, |di, _| targets.push(di));
        let data = self.data_mut();
        for di in targets {
            data[di..di + 4].fill(0);
        }
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn composite_operator(&self) -> CompositeOperator {
        self.composite
    }

    fn set_composite_operator(&mut self, op: CompositeOperator) {
        self.composite = op;
    }

    fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    fn filter(&self) -> Option<CpuFilterNode> {
        self.filter.clone()
    }

    fn set_filter(&mut self, filter: Option<CpuFilterNode>) {
        self.filter = filter;
    }

    fn color_matrix_override(&self) -> Option<ColorMatrix> {
        self.color_matrix
    }

    fn set_color_matrix_override(&mut self, matrix: Option<ColorMatrix>) {
        self.color_matrix = matrix;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
