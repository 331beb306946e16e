use crate::effects::color_matrix::ColorMatrix;
use crate::effects::filter::{DropShadowFilter, Filter, std_deviation};
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::backend::{
    DrawingSurface, FilterAttribute, FilterGraphHost, FilterInput, FilterOperator, FilterPrimitive,
};

/// What an effect call ended up doing to the target's draw state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOutcome {
    /// No filter attached and no color override; identity draw.
    None,
    /// A cached native filter graph is attached.
    Native,
    /// Folded into the global alpha; no filter graph involved.
    AlphaOnly,
    /// Stored as a per-pixel color-matrix override for the surface to apply in software.
    Software,
    /// The effect needs native filter graphs and the host has none; nothing was attached.
    Skipped,
}

#[derive(Clone, Debug)]
struct BlurGraph<N> {
    root: N,
    blur: N,
}

#[derive(Clone, Debug)]
struct DropShadowGraph<N> {
    root: N,
    blur: N,
    offset: N,
    flood: N,
}

#[derive(Clone, Debug)]
struct ColorMatrixGraph<N> {
    root: N,
    matrix: N,
}

/// Translates effect descriptors into filter-graph parameters on a drawing surface.
///
/// Each graph kind is constructed at most once, on first use, and re-parameterized per call.
/// The cached nodes are mutable shared state: a graph attached by one call must be consumed by
/// its draw before the next call on this pipeline re-parameterizes it.
pub struct EffectPipeline<H: FilterGraphHost> {
    host: Option<H>,
    blur: Option<BlurGraph<H::Node>>,
    drop_shadow: Option<DropShadowGraph<H::Node>>,
    color_matrix: Option<ColorMatrixGraph<H::Node>>,
}

impl<H: FilterGraphHost> EffectPipeline<H> {
    /// `host` is `None` when the target has no native filter graphs.
    pub fn new(host: Option<H>) -> Self {
        Self {
            host,
            blur: None,
            drop_shadow: None,
            color_matrix: None,
        }
    }

    pub fn supports_native_filters(&self) -> bool {
        self.host.is_some()
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    /// Attaches a gaussian blur of `(blur_x, blur_y)` scaled for `quality` and device `ratio`.
    pub fn apply_blur<S>(
        &mut self,
        ratio: f64,
        target: &mut S,
        blur_x: f64,
        blur_y: f64,
        quality: u8,
    ) -> TesseraResult<()>
    where
        S: DrawingSurface<FilterNode = H::Node>,
    {
        let host = self
            .host
            .as_mut()
            .ok_or_else(|| TesseraError::unsupported("blur requires native filter graphs"))?;
        if self.blur.is_none() {
            self.blur = Some(build_blur(host)?);
            tracing::debug!("constructed blur filter graph");
        }
        let Some(graph) = self.blur.as_ref() else {
            return Err(TesseraError::evaluation("blur filter graph missing"));
        };

        let (dx, dy) = std_deviation(ratio, blur_x, blur_y, quality);
        host.set_attribute(&graph.blur, FilterAttribute::StdDeviation { dx, dy })?;
        target.set_filter(Some(graph.root.clone()));
        Ok(())
    }

    pub fn apply_drop_shadow<S>(
        &mut self,
        ratio: f64,
        target: &mut S,
        params: &DropShadowFilter,
    ) -> TesseraResult<()>
    where
        S: DrawingSurface<FilterNode = H::Node>,
    {
        let host = self
            .host
            .as_mut()
            .ok_or_else(|| TesseraError::unsupported("drop shadow requires native filter graphs"))?;
        if self.drop_shadow.is_none() {
            self.drop_shadow = Some(build_drop_shadow(host)?);
            tracing::debug!("constructed drop-shadow filter graph");
        }
        let Some(graph) = self.drop_shadow.as_ref() else {
            return Err(TesseraError::evaluation("drop-shadow filter graph missing"));
        };

        let (dx, dy) = params.std_deviation(ratio);
        host.set_attribute(&graph.blur, FilterAttribute::StdDeviation { dx, dy })?;
        let (dx, dy) = params.offset(ratio);
        host.set_attribute(&graph.offset, FilterAttribute::Offset { dx, dy })?;
        host.set_attribute(&graph.flood, FilterAttribute::FloodColor(params.flood_color()))?;
        target.set_filter(Some(graph.root.clone()));
        Ok(())
    }

    /// Detaches whatever filter graph is active on `target`.
    pub fn clear_filter<S>(&self, target: &mut S)
    where
        S: DrawingSurface<FilterNode = H::Node>,
    {
        target.set_filter(None);
    }

    /// Applies a color transform through the cheapest path that expresses it:
    /// identity, alpha-only, native color-matrix graph, then software override.
    pub fn apply_color_matrix<S>(
        &mut self,
        target: &mut S,
        matrix: &ColorMatrix,
    ) -> TesseraResult<FilterOutcome>
    where
        S: DrawingSurface<FilterNode = H::Node>,
    {
        self.clear_filter(target);

        if matrix.is_identity() {
            target.set_global_alpha(1.0);
            target.set_color_matrix_override(None);
            return Ok(FilterOutcome::None);
        }

        if let Some(k) = matrix.alpha_multiplier() {
            target.set_global_alpha(k);
            target.set_color_matrix_override(None);
            return Ok(FilterOutcome::AlphaOnly);
        }

        // The matrix carries its own alpha row from here on.
        target.set_global_alpha(1.0);
        let Some(host) = self.host.as_mut() else {
            target.set_color_matrix_override(Some(*matrix));
            return Ok(FilterOutcome::Software);
        };
        if self.color_matrix.is_none() {
            self.color_matrix = Some(build_color_matrix(host)?);
            tracing::debug!("constructed color-matrix filter graph");
        }
        let Some(graph) = self.color_matrix.as_ref() else {
            return Err(TesseraError::evaluation("color-matrix filter graph missing"));
        };

        host.set_attribute(
            &graph.matrix,
            FilterAttribute::Values(matrix.to_filter_values()),
        )?;
        target.set_filter(Some(graph.root.clone()));
        target.set_color_matrix_override(None);
        Ok(FilterOutcome::Native)
    }

    /// Applies the effects carried by one draw call.
    ///
    /// Only the last filter is honored; earlier ones are dropped. Blur and drop shadow are
    /// skipped when the host has no filter graphs.
    #[tracing::instrument(skip(self, target, filters), fields(count = filters.len()))]
    pub fn apply_filters<S>(
        &mut self,
        target: &mut S,
        ratio: f64,
        filters: &[Filter],
    ) -> TesseraResult<FilterOutcome>
    where
        S: DrawingSurface<FilterNode = H::Node>,
    {
        let Some(filter) = filters.last() else {
            self.clear_filter(target);
            return Ok(FilterOutcome::None);
        };
        if filters.len() > 1 {
            tracing::debug!(dropped = filters.len() - 1, "only the last filter is applied");
        }

        match filter {
            Filter::ColorMatrix(m) => self.apply_color_matrix(target, m),
            Filter::Blur(_) | Filter::DropShadow(_) if !self.supports_native_filters() => {
                tracing::debug!(?filter, "no native filter graphs, skipping");
                self.clear_filter(target);
                Ok(FilterOutcome::Skipped)
            }
            Filter::Blur(b) => {
                self.apply_blur(ratio, target, b.blur_x, b.blur_y, b.quality)?;
                Ok(FilterOutcome::Native)
            }
            Filter::DropShadow(d) => {
                self.apply_drop_shadow(ratio, target, d)?;
                Ok(FilterOutcome::Native)
            }
        }
    }
}

fn build_blur<H: FilterGraphHost>(host: &mut H) -> TesseraResult<BlurGraph<H::Node>> {
    let root = host.create_node(FilterPrimitive::Filter)?;
    let blur = host.create_node(FilterPrimitive::GaussianBlur)?;
    host.set_attribute(&blur, FilterAttribute::Input(FilterInput::SourceGraphic))?;
    host.append_child(&root, &blur)?;
    Ok(BlurGraph { root, blur })
}

// blur(SourceAlpha) -> offset -> flood -> composite(in) -> merge(shadow, SourceGraphic)
fn build_drop_shadow<H: FilterGraphHost>(host: &mut H) -> TesseraResult<DropShadowGraph<H::Node>> {
    let root = host.create_node(FilterPrimitive::Filter)?;

    let blur = host.create_node(FilterPrimitive::GaussianBlur)?;
    host.set_attribute(&blur, FilterAttribute::Input(FilterInput::SourceAlpha))?;
    host.set_attribute(&blur, FilterAttribute::Result("blur"))?;
    host.append_child(&root, &blur)?;

    let offset = host.create_node(FilterPrimitive::Offset)?;
    host.set_attribute(&offset, FilterAttribute::Input(FilterInput::Result("blur")))?;
    host.set_attribute(&offset, FilterAttribute::Result("offset"))?;
    host.append_child(&root, &offset)?;

    let flood = host.create_node(FilterPrimitive::Flood)?;
    host.set_attribute(&flood, FilterAttribute::Result("flood"))?;
    host.append_child(&root, &flood)?;

    let shadow = host.create_node(FilterPrimitive::Composite)?;
    host.set_attribute(&shadow, FilterAttribute::Input(FilterInput::Result("flood")))?;
    host.set_attribute(&shadow, FilterAttribute::Input2(FilterInput::Result("offset")))?;
    host.set_attribute(&shadow, FilterAttribute::Operator(FilterOperator::In))?;
    host.set_attribute(&shadow, FilterAttribute::Result("shadow"))?;
    host.append_child(&root, &shadow)?;

    let merge = host.create_node(FilterPrimitive::Merge)?;
    for input in [FilterInput::Result("shadow"), FilterInput::SourceGraphic] {
        let node = host.create_node(FilterPrimitive::MergeNode)?;
        host.set_attribute(&node, FilterAttribute::Input(input))?;
        host.append_child(&merge, &node)?;
    }
    host.append_child(&root, &merge)?;

    Ok(DropShadowGraph {
        root,
        blur,
        offset,
        flood,
    })
}

fn build_color_matrix<H: FilterGraphHost>(
    host: &mut H,
) -> TesseraResult<ColorMatrixGraph<H::Node>> {
    let root = host.create_node(FilterPrimitive::Filter)?;
    let matrix = host.create_node(FilterPrimitive::ColorMatrix)?;
    host.set_attribute(&matrix, FilterAttribute::Input(FilterInput::SourceGraphic))?;
    host.append_child(&root, &matrix)?;
    Ok(ColorMatrixGraph { root, matrix })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/pipeline.rs"]
mod tests;
