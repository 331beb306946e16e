use std::marker::PhantomData;

use crate::effects::blend::CompositeOperator;
use crate::effects::color_matrix::ColorMatrix;
use crate::foundation::core::{Affine, Region, Rgba8Premul};
use crate::foundation::error::{TesseraError, TesseraResult};

/// Host 2D drawing surface that regions composite into.
///
/// Draw state (transform, composite operator, global alpha, filter, color-matrix override) is a
/// property of the whole surface: it applies to every subsequent draw regardless of which region
/// the pixels land in.
///
/// Rectangles are not validated against the surface bounds by callers; implementations decide
/// how to treat out-of-range pixels (the CPU surface clips).
pub trait DrawingSurface {
    /// Host handle of an attachable filter graph.
    type FilterNode: Clone + std::fmt::Debug;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Creates an offscreen surface compatible with `self` (same pixel format and host).
    fn offscreen(&self, width: u32, height: u32) -> TesseraResult<Self>
    where
        Self: Sized;

    /// Copies `src_rect` of `src` into `dst_rect` of `self` under the current draw state.
    fn draw_image(&mut self, src: &Self, src_rect: Region, dst_rect: Region) -> TesseraResult<()>;

    fn fill_rect(&mut self, rect: Region, color: Rgba8Premul);

    /// Sets `rect` to transparent, ignoring the composite operator.
    fn clear_rect(&mut self, rect: Region);

    fn set_transform(&mut self, transform: Affine);

    fn composite_operator(&self) -> CompositeOperator;

    fn set_composite_operator(&mut self, op: CompositeOperator);

    fn global_alpha(&self) -> f32;

    fn set_global_alpha(&mut self, alpha: f32);

    fn filter(&self) -> Option<Self::FilterNode>;

    /// `None` detaches the active filter.
    fn set_filter(&mut self, filter: Option<Self::FilterNode>);

    fn color_matrix_override(&self) -> Option<ColorMatrix>;

    /// Per-pixel color transform the surface applies to drawn images when no filter graph
    /// expresses it.
    fn set_color_matrix_override(&mut self, matrix: Option<ColorMatrix>);
}

/// Bin-packing allocator owning the rectangles of one backing surface.
pub trait RegionAllocator {
    /// Returns `None` when the backing surface has no room left.
    fn allocate(&mut self, w: u32, h: u32) -> Option<Region>;

    fn free(&mut self, region: Region);
}

/// Filter-graph primitive kinds a host can construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterPrimitive {
    /// Root container attached to a surface.
    Filter,
    GaussianBlur,
    Offset,
    Flood,
    Composite,
    Merge,
    MergeNode,
    ColorMatrix,
}

impl FilterPrimitive {
    pub fn is_container(self) -> bool {
        matches!(self, FilterPrimitive::Filter | FilterPrimitive::Merge)
    }
}

/// Input of a filter primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterInput {
    SourceGraphic,
    SourceAlpha,
    Result(&'static str),
}

/// Porter-Duff operator of a [`FilterPrimitive::Composite`] node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    #[default]
    Over,
    In,
    Out,
}

/// Parameter of a filter primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterAttribute {
    Input(FilterInput),
    Input2(FilterInput),
    Result(&'static str),
    StdDeviation { dx: f64, dy: f64 },
    Offset { dx: f64, dy: f64 },
    /// `#rrggbbaa`
    FloodColor(String),
    Operator(FilterOperator),
    /// Color-matrix parameter string, see [`ColorMatrix::to_filter_values`].
    Values(String),
}

/// Native filter-graph construction facility.
///
/// Node construction is expensive on real hosts; callers are expected to build each graph once
/// and re-parameterize it per draw.
pub trait FilterGraphHost {
    type Node: Clone + std::fmt::Debug;

    fn create_node(&mut self, primitive: FilterPrimitive) -> TesseraResult<Self::Node>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> TesseraResult<()>;

    fn set_attribute(&mut self, node: &Self::Node, attr: FilterAttribute) -> TesseraResult<()>;
}

/// Host stand-in for targets without native filter graphs. Every call fails.
#[derive(Debug)]
pub struct NoFilterGraph<N>(PhantomData<N>);

impl<N> Default for NoFilterGraph<N> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<N: Clone + std::fmt::Debug> FilterGraphHost for NoFilterGraph<N> {
    type Node = N;

    fn create_node(&mut self, primitive: FilterPrimitive) -> TesseraResult<N> {
        Err(TesseraError::unsupported(format!(
            "native filter graphs are unavailable (creating {primitive:?})"
        )))
    }

    fn append_child(&mut self, _parent: &N, _child: &N) -> TesseraResult<()> {
        Err(TesseraError::unsupported("native filter graphs are unavailable"))
    }

    fn set_attribute(&mut self, _node: &N, _attr: FilterAttribute) -> TesseraResult<()> {
        Err(TesseraError::unsupported("native filter graphs are unavailable"))
    }
}
