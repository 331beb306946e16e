use crate::effects::blend::CompositeOperator;
use crate::foundation::core::Affine;
use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::math::next_pow2;
use crate::render::backend::DrawingSurface;
use crate::render::context::RenderStats;

/// Reusable offscreen surface that grows to power-of-two sizes and never shrinks.
///
/// When the rounded size exceeds what the backend accepts, the exact requested size is used.
///
/// Contents are not preserved across growth; callers clear what they use.
pub(crate) struct ScratchSurface<S> {
    surface: Option<S>,
}

impl<S> Default for ScratchSurface<S> {
    fn default() -> Self {
        Self { surface: None }
    }
}

impl<S: DrawingSurface> ScratchSurface<S> {
    /// Returns a scratch surface of at least `w` x `h`, created compatible with `proto`.
    ///
    /// The returned surface has neutral draw state: identity transform, `source-over`, alpha 1,
    /// no filter, no color override.
    pub(crate) fn ensure(
        &mut self,
        proto: &S,
        w: u32,
        h: u32,
        stats: &mut RenderStats,
    ) -> TesseraResult<&mut S> {
        let (cur_w, cur_h) = self.size().unwrap_or((0, 0));
        if self.surface.is_none() || cur_w < w || cur_h < h {
            let new_w = cur_w.max(next_pow2(w));
            let new_h = cur_h.max(next_pow2(h));
            tracing::trace!(new_w, new_h, "growing scratch surface");
            let grown = match proto.offscreen(new_w, new_h) {
                Ok(s) => s,
                Err(err) => {
                    // Rounded size past the backend limit; the exact request may still fit.
                    let (exact_w, exact_h) = (cur_w.max(w), cur_h.max(h));
                    tracing::debug!(%err, exact_w, exact_h, "retrying scratch at exact size");
                    proto.offscreen(exact_w, exact_h)?
                }
            };
            self.surface = Some(grown);
            stats.scratch_grows = stats.scratch_grows.saturating_add(1);
        }

        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| TesseraError::evaluation("scratch surface missing"))?;
        reset_draw_state(surface);
        Ok(surface)
    }

    pub(crate) fn size(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|s| (s.width(), s.height()))
    }
}

pub(crate) fn reset_draw_state<S: DrawingSurface>(surface: &mut S) {
    surface.set_transform(Affine::IDENTITY);
    surface.set_composite_operator(CompositeOperator::SourceOver);
    surface.set_global_alpha(1.0);
    surface.set_filter(None);
    surface.set_color_matrix_override(None);
}

/// The two process-wide scratch surfaces, owned by a render context.
pub(crate) struct ScratchSurfaces<S> {
    /// Breaks source/destination aliasing when both live on one backing surface.
    pub(crate) copy: ScratchSurface<S>,
    /// Isolates slow blend modes on large backing surfaces.
    pub(crate) blend: ScratchSurface<S>,
}

impl<S> Default for ScratchSurfaces<S> {
    fn default() -> Self {
        Self {
            copy: ScratchSurface::default(),
            blend: ScratchSurface::default(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scratch.rs"]
mod tests;
