use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::effects::blur::blur_rgba8_premul;
use crate::effects::color_matrix::ColorMatrix;
use crate::effects::composite::over;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::math::{mul_div255_u8, premultiply, unpremultiply};
use crate::render::backend::{
    FilterAttribute, FilterGraphHost, FilterInput, FilterOperator, FilterPrimitive,
};

/// Software filter-graph node. Clones share the same node.
#[derive(Clone, Debug)]
pub struct CpuFilterNode(Rc<RefCell<NodeData>>);

#[derive(Debug)]
struct NodeData {
    primitive: FilterPrimitive,
    input: Option<FilterInput>,
    input2: Option<FilterInput>,
    result: Option<&'static str>,
    std_deviation: (f64, f64),
    offset: (f64, f64),
    flood_color: [u8; 4],
    operator: FilterOperator,
    matrix: Option<ColorMatrix>,
    children: Vec<CpuFilterNode>,
}

impl CpuFilterNode {
    fn new(primitive: FilterPrimitive) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            primitive,
            input: None,
            input2: None,
            result: None,
            std_deviation: (0.0, 0.0),
            offset: (0.0, 0.0),
            flood_color: [0, 0, 0, 255],
            operator: FilterOperator::default(),
            matrix: None,
            children: Vec::new(),
        })))
    }

    pub fn primitive(&self) -> FilterPrimitive {
        self.0.borrow().primitive
    }

    pub fn children(&self) -> Vec<CpuFilterNode> {
        self.0.borrow().children.clone()
    }

    pub fn std_deviation(&self) -> (f64, f64) {
        self.0.borrow().std_deviation
    }

    pub fn offset(&self) -> (f64, f64) {
        self.0.borrow().offset
    }

    /// Premultiplied flood color.
    pub fn flood_color(&self) -> [u8; 4] {
        self.0.borrow().flood_color
    }

    pub fn matrix(&self) -> Option<ColorMatrix> {
        self.0.borrow().matrix
    }

    pub fn ptr_eq(&self, other: &CpuFilterNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// First descendant (depth-first) of the given primitive.
    pub fn find(&self, primitive: FilterPrimitive) -> Option<CpuFilterNode> {
        for child in self.0.borrow().children.iter() {
            if child.primitive() == primitive {
                return Some(child.clone());
            }
            if let Some(found) = child.find(primitive) {
                return Some(found);
            }
        }
        None
    }
}

/// Builds [`CpuFilterNode`] graphs for [`crate::CpuSurface`].
#[derive(Debug, Default)]
pub struct CpuFilterHost {
    created: usize,
}

impl CpuFilterHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes constructed so far.
    pub fn created_nodes(&self) -> usize {
        self.created
    }
}

impl FilterGraphHost for CpuFilterHost {
    type Node = CpuFilterNode;

    fn create_node(&mut self, primitive: FilterPrimitive) -> TesseraResult<CpuFilterNode> {
        self.created += 1;
        Ok(CpuFilterNode::new(primitive))
    }

    fn append_child(&mut self, parent: &CpuFilterNode, child: &CpuFilterNode) -> TesseraResult<()> {
        if !parent.primitive().is_container() {
            return Err(TesseraError::validation(format!(
                "{:?} cannot hold child primitives",
                parent.primitive()
            )));
        }
        if parent.ptr_eq(child) {
            return Err(TesseraError::validation("filter node cannot contain itself"));
        }
        parent.0.borrow_mut().children.push(child.clone());
        Ok(())
    }

    fn set_attribute(&mut self, node: &CpuFilterNode, attr: FilterAttribute) -> TesseraResult<()> {
        let mut data = node.0.borrow_mut();
        match attr {
            FilterAttribute::Input(i) => data.input = Some(i),
            FilterAttribute::Input2(i) => data.input2 = Some(i),
            FilterAttribute::Result(name) => data.result = Some(name),
            FilterAttribute::StdDeviation { dx, dy } => {
                if !(dx.is_finite() && dy.is_finite()) || dx < 0.0 || dy < 0.0 {
                    return Err(TesseraError::validation(
                        "stdDeviation must be finite and >= 0",
                    ));
                }
                data.std_deviation = (dx, dy);
            }
            FilterAttribute::Offset { dx, dy } => {
                if !(dx.is_finite() && dy.is_finite()) {
                    return Err(TesseraError::validation("offset must be finite"));
                }
                data.offset = (dx, dy);
            }
            FilterAttribute::FloodColor(s) => data.flood_color = parse_rgba_hex(&s)?,
            FilterAttribute::Operator(op) => data.operator = op,
            FilterAttribute::Values(s) => {
                let m = ColorMatrix::from_filter_values(&s).ok_or_else(|| {
                    TesseraError::validation(format!("invalid color-matrix values '{s}'"))
                })?;
                data.matrix = Some(m);
            }
        }
        Ok(())
    }
}

/// `#rrggbbaa` to premultiplied RGBA8.
fn parse_rgba_hex(s: &str) -> TesseraResult<[u8; 4]> {
    let hex = s
        .strip_prefix('#')
        .filter(|h| h.len() == 8 && h.is_ascii())
        .ok_or_else(|| TesseraError::validation(format!("flood color must be #rrggbbaa, got '{s}'")))?;
    let mut px = [0u8; 4];
    for (i, c) in px.iter_mut().enumerate() {
        *c = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| TesseraError::validation(format!("invalid hex in flood color '{s}'")))?;
    }
    let a = u16::from(px[3]);
    Ok([
        mul_div255_u8(u16::from(px[0]), a),
        mul_div255_u8(u16::from(px[1]), a),
        mul_div255_u8(u16::from(px[2]), a),
        px[3],
    ])
}

/// Runs the graph rooted at `root` over a `width`x`height` premultiplied source buffer.
///
/// Output is clipped to the source bounds.
pub(crate) fn evaluate(
    root: &CpuFilterNode,
    source: &[u8],
    width: u32,
    height: u32,
) -> TesseraResult<Vec<u8>> {
    if root.primitive() != FilterPrimitive::Filter {
        return Err(TesseraError::evaluation(format!(
            "filter graph root must be Filter, got {:?}",
            root.primitive()
        )));
    }

    let mut named: SmallVec<[(&'static str, Vec<u8>); 4]> = SmallVec::new();
    let mut last = source.to_vec();

    for node in root.children() {
        let data = node.0.borrow();
        let resolve = |input: Option<FilterInput>, last: &Vec<u8>| -> TesseraResult<Vec<u8>> {
            match input {
                None => Ok(last.clone()),
                Some(FilterInput::SourceGraphic) => Ok(source.to_vec()),
                Some(FilterInput::SourceAlpha) => Ok(source_alpha(source)),
                Some(FilterInput::Result(name)) => named
                    .iter()
                    .rev()
                    .find(|(n, _)| *n == name)
                    .map(|(_, buf)| buf.clone())
                    .ok_or_else(|| {
                        TesseraError::evaluation(format!("unknown filter result '{name}'"))
                    }),
            }
        };

        let out = match data.primitive {
            FilterPrimitive::GaussianBlur => {
                let input = resolve(data.input, &last)?;
                let (dx, dy) = data.std_deviation;
                blur_rgba8_premul(&input, width, height, dx as f32, dy as f32)?
            }
            FilterPrimitive::Offset => {
                let input = resolve(data.input, &last)?;
                shift(&input, width, height, data.offset)
            }
            FilterPrimitive::Flood => data.flood_color.repeat(source.len() / 4),
            FilterPrimitive::Composite => {
                let a = resolve(data.input, &last)?;
                let b = resolve(data.input2, &last)?;
                porter_duff(data.operator, &a, &b)
            }
            FilterPrimitive::Merge => {
                let mut acc = vec![0u8; source.len()];
                for child in data.children.iter() {
                    let child = child.0.borrow();
                    if child.primitive != FilterPrimitive::MergeNode {
                        return Err(TesseraError::evaluation("Merge may only contain MergeNode"));
                    }
                    let layer = resolve(child.input, &last)?;
                    for (d, s) in acc.chunks_exact_mut(4).zip(layer.chunks_exact(4)) {
                        let px = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
                        d.copy_from_slice(&px);
                    }
                }
                acc
            }
            FilterPrimitive::ColorMatrix => {
                let mut input = resolve(data.input, &last)?;
                if let Some(m) = data.matrix {
                    apply_color_matrix(&mut input, &m);
                }
                input
            }
            FilterPrimitive::Filter | FilterPrimitive::MergeNode => {
                return Err(TesseraError::evaluation(format!(
                    "{:?} is not valid at graph top level",
                    data.primitive
                )));
            }
        };

        if let Some(name) = data.result {
            named.push((name, out.clone()));
        }
        last = out;
    }

    Ok(last)
}

pub(crate) fn apply_color_matrix(buf: &mut [u8], m: &ColorMatrix) {
    for px in buf.chunks_exact_mut(4) {
        let out = premultiply(m.apply_unit(unpremultiply([px[0], px[1], px[2], px[3]])));
        px.copy_from_slice(&out);
    }
}

fn source_alpha(source: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; source.len()];
    for (d, s) in out.chunks_exact_mut(4).zip(source.chunks_exact(4)) {
        d[3] = s[3];
    }
    out
}

fn shift(src: &[u8], width: u32, height: u32, offset: (f64, f64)) -> Vec<u8> {
    let (dx, dy) = (offset.0.round() as i64, offset.1.round() as i64);
    let (w, h) = (i64::from(width), i64::from(height));
    let mut out = vec![0u8; src.len()];
    for y in 0..h {
        let sy = y - dy;
        if !(0..h).contains(&sy) {
            continue;
        }
        for x in 0..w {
            let sx = x - dx;
            if !(0..w).contains(&sx) {
                continue;
            }
            let si = ((sy * w + sx) * 4) as usize;
            let di = ((y * w + x) * 4) as usize;
            out[di..di + 4].copy_from_slice(&src[si..si + 4]);
        }
    }
    out
}

fn porter_duff(op: FilterOperator, a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; a.len()];
    for ((o, a), b) in out
        .chunks_exact_mut(4)
        .zip(a.chunks_exact(4))
        .zip(b.chunks_exact(4))
    {
        let px = match op {
            FilterOperator::Over => over([b[0], b[1], b[2], b[3]], [a[0], a[1], a[2], a[3]], 1.0),
            FilterOperator::In => {
                let ba = u16::from(b[3]);
                [a[0], a[1], a[2], a[3]].map(|c| mul_div255_u8(u16::from(c), ba))
            }
            FilterOperator::Out => {
                let inv = 255 - u16::from(b[3]);
                [a[0], a[1], a[2], a[3]].map(|c| mul_div255_u8(u16::from(c), inv))
            }
        };
        o.copy_from_slice(&px);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu_filter.rs"]
mod tests;
