//! Tessera composites many small drawables into shared atlas surfaces.
//!
//! A [`Surface`] owns one backing [`DrawingSurface`] and a [`RegionAllocator`] that subdivides
//! it. Each allocated [`SurfaceRegion`] can be drawn into from any other region, including one on
//! the same backing surface, under a [`BlendMode`] and with [`Filter`] effects attached.
//!
//! Everything that is shared across draws (scratch surfaces, cached filter graphs, host
//! capabilities) lives in a [`RenderContext`] the caller passes to each operation:
//!
//! - Build [`RenderingCapabilities`] once for the host
//! - Create a [`RenderContext`] with an optional [`FilterGraphHost`]
//! - Allocate regions, set blend modes and effects, then [`SurfaceRegion::draw`]
//!
//! [`CpuSurface`] and [`CpuFilterHost`] are a software backend for headless use and tests.
#![forbid(unsafe_code)]

mod effects;
mod foundation;
mod render;

pub use crate::foundation::core::{Affine, Rect, Region, Rgba8Premul};
pub use crate::foundation::error::{TesseraError, TesseraResult};

pub use crate::effects::blend::{
    BlendMode, CompositeOperator, is_expensive_at_scale, to_composite_operator,
};
pub use crate::effects::blur::{blur_rgba8_premul, radius_for_sigma};
pub use crate::effects::color_matrix::ColorMatrix;
pub use crate::effects::composite::{PremulRgba8, composite, composite_in_place, over};
pub use crate::effects::filter::{
    BlurFilter, DropShadowFilter, Filter, MAX_QUALITY, quality_factor, std_deviation,
};
pub use crate::effects::pipeline::{EffectPipeline, FilterOutcome};

pub use crate::render::backend::{
    DrawingSurface, FilterAttribute, FilterGraphHost, FilterInput, FilterOperator,
    FilterPrimitive, NoFilterGraph, RegionAllocator,
};
pub use crate::render::capabilities::{
    DEFAULT_SLOW_BLEND_THRESHOLD, HostProfile, RenderingCapabilities,
};
pub use crate::render::context::{RenderContext, RenderStats};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::cpu_filter::{CpuFilterHost, CpuFilterNode};
pub use crate::render::surface::{Surface, SurfaceRegion};
