use crate::effects::pipeline::EffectPipeline;
use crate::render::backend::{DrawingSurface, FilterGraphHost, NoFilterGraph};
use crate::render::capabilities::RenderingCapabilities;
use crate::render::scratch::ScratchSurfaces;

/// Counters for the compositing paths taken since the context was created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub direct_draws: u64,
    pub scratch_copies: u64,
    pub emulated_blends: u64,
    pub scratch_grows: u64,
    pub filters_applied: u64,
    pub filters_skipped: u64,
}

/// Explicit owner of everything compositing shares across draws: host capabilities, the copy
/// and blend scratch surfaces, and the cached filter graphs.
///
/// One context per rendering thread. A draw must finish before the next begins, and a filter
/// attached through this context must be consumed before the next effect call.
pub struct RenderContext<S, H>
where
    S: DrawingSurface,
    H: FilterGraphHost<Node = S::FilterNode>,
{
    pub(crate) caps: RenderingCapabilities,
    pub(crate) scratch: ScratchSurfaces<S>,
    pub(crate) effects: EffectPipeline<H>,
    pub(crate) stats: RenderStats,
}

impl<S, H> RenderContext<S, H>
where
    S: DrawingSurface,
    H: FilterGraphHost<Node = S::FilterNode>,
{
    /// The capability flag is authoritative: `host` is dropped when native filter graphs are
    /// reported unsupported, and the flag is cleared when no host is given.
    pub fn new(mut caps: RenderingCapabilities, host: Option<H>) -> Self {
        let host = match (caps.native_filter_graphs, host) {
            (true, Some(h)) => Some(h),
            (true, None) => {
                tracing::debug!("native filter graphs reported but no host given");
                caps.native_filter_graphs = false;
                None
            }
            (false, _) => None,
        };
        Self {
            caps,
            scratch: ScratchSurfaces::default(),
            effects: EffectPipeline::new(host),
            stats: RenderStats::default(),
        }
    }

    pub fn caps(&self) -> &RenderingCapabilities {
        &self.caps
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RenderStats::default();
    }

    pub fn effects(&self) -> &EffectPipeline<H> {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectPipeline<H> {
        &mut self.effects
    }

    pub fn copy_scratch_size(&self) -> Option<(u32, u32)> {
        self.scratch.copy.size()
    }

    pub fn blend_scratch_size(&self) -> Option<(u32, u32)> {
        self.scratch.blend.size()
    }
}

impl<S: DrawingSurface> RenderContext<S, NoFilterGraph<S::FilterNode>> {
    /// Context for targets that have no native filter graphs at all.
    pub fn without_filter_graphs(caps: RenderingCapabilities) -> Self {
        Self::new(caps.with_native_filter_graphs(false), None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/context.rs"]
mod tests;
