use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::effects::blend::{BlendMode, CompositeOperator, to_composite_operator};
use crate::effects::color_matrix::ColorMatrix;
use crate::effects::filter::Filter;
use crate::effects::pipeline::FilterOutcome;
use crate::foundation::core::{Affine, Region, Rgba8Premul};
use crate::foundation::error::TesseraResult;
use crate::render::backend::{DrawingSurface, FilterGraphHost, RegionAllocator};
use crate::render::context::{RenderContext, RenderStats};
use crate::render::scratch::{ScratchSurface, reset_draw_state};

struct SurfaceShared<S> {
    target: RefCell<S>,
    allocator: RefCell<Box<dyn RegionAllocator>>,
    width: u32,
    height: u32,
}

/// One backing drawing surface plus the allocator that subdivides it into regions.
///
/// Regions keep a weak back-reference; using a region after its `Surface` is dropped panics.
pub struct Surface<S> {
    shared: Rc<SurfaceShared<S>>,
}

impl<S: DrawingSurface> Surface<S> {
    /// Dimensions are taken from `target` and fixed for the lifetime of the surface.
    pub fn new(target: S, allocator: impl RegionAllocator + 'static) -> Self {
        let (width, height) = (target.width(), target.height());
        Self {
            shared: Rc::new(SurfaceShared {
                target: RefCell::new(target),
                allocator: RefCell::new(Box::new(allocator)),
                width,
                height,
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.shared.width
    }

    pub fn height(&self) -> u32 {
        self.shared.height
    }

    /// Returns `None` when the allocator is exhausted; the surface never grows on its own.
    pub fn allocate(&self, w: u32, h: u32) -> Option<SurfaceRegion<S>> {
        let region = self.shared.allocator.borrow_mut().allocate(w, h)?;
        Some(SurfaceRegion {
            surface: Rc::downgrade(&self.shared),
            region,
            blend_mode: BlendMode::Normal,
        })
    }

    /// Returns the region's rectangle to the allocator. The handle is consumed:
    ///
    /// ```compile_fail
    /// use tessera::{CpuSurface, Region, RegionAllocator, Surface};
    ///
    /// struct Whole;
    /// impl RegionAllocator for Whole {
    ///     fn allocate(&mut self, w: u32, h: u32) -> Option<Region> {
    ///         Some(Region::new(0, 0, w, h))
    ///     }
    ///     fn free(&mut self, _region: Region) {}
    /// }
    ///
    /// let surface = Surface::new(CpuSurface::new(8, 8).unwrap(), Whole);
    /// let region = surface.allocate(4, 4).unwrap();
    /// surface.free(region);
    /// region.reset_transform();
    /// ```
    ///
    /// # Panics
    ///
    /// If `region` was allocated from a different surface.
    pub fn free(&self, region: SurfaceRegion<S>) {
        assert!(
            region.surface.ptr_eq(&Rc::downgrade(&self.shared)),
            "region freed into a surface it was not allocated from"
        );
        self.shared.allocator.borrow_mut().free(region.region);
    }

    pub fn with_target<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.shared.target.borrow())
    }

    pub fn with_target_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut *self.shared.target.borrow_mut())
    }
}

impl<S> std::fmt::Debug for Surface<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.shared.width)
            .field("height", &self.shared.height)
            .finish()
    }
}

/// Drawable handle on one allocated rectangle of a [`Surface`].
///
/// Draw state (blend mode, transform, filter) lives on the backing surface, so it is shared by
/// every region on that surface. Set it immediately before the draw that needs it.
pub struct SurfaceRegion<S> {
    surface: Weak<SurfaceShared<S>>,
    region: Region,
    blend_mode: BlendMode,
}

impl<S> std::fmt::Debug for SurfaceRegion<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceRegion")
            .field("region", &self.region)
            .field("blend_mode", &self.blend_mode)
            .finish()
    }
}

impl<S: DrawingSurface> SurfaceRegion<S> {
    fn shared(&self) -> Rc<SurfaceShared<S>> {
        self.surface
            .upgrade()
            .unwrap_or_else(|| panic!("surface region {:?} used after its surface", self.region))
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn width(&self) -> u32 {
        self.region.w
    }

    pub fn height(&self) -> u32 {
        self.region.h
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Updates the backing surface's composite operator; a no-op when `mode` is unchanged.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        if self.blend_mode == mode {
            return;
        }
        self.blend_mode = mode;
        self.shared()
            .target
            .borrow_mut()
            .set_composite_operator(to_composite_operator(mode));
    }

    /// Whether both regions live on the same backing surface.
    pub fn shares_backing_with(&self, other: &SurfaceRegion<S>) -> bool {
        self.surface.ptr_eq(&other.surface)
    }

    pub fn reset_transform(&self) {
        self.shared()
            .target
            .borrow_mut()
            .set_transform(Affine::IDENTITY);
    }

    /// Fills the whole region under the backing surface's current draw state.
    pub fn fill(&self, color: Rgba8Premul) {
        self.shared()
            .target
            .borrow_mut()
            .fill_rect(self.region, color);
    }

    /// Clears `rect` (relative to the region origin) or, with `None`, the whole region.
    pub fn clear(&self, rect: Option<Region>) {
        let rect = match rect {
            Some(r) => r.offset(self.region.x, self.region.y),
            None => self.region,
        };
        self.shared().target.borrow_mut().clear_rect(rect);
    }

    /// Composites the `w` x `h` block at `source`'s origin into this region at `(x, y)`.
    ///
    /// `(x, y)` is an offset inside this region. The backing surface's transform is reset to
    /// identity first; blend mode and effects stay as set. Neither rectangle is validated
    /// against its surface bounds.
    #[tracing::instrument(
        skip(self, ctx, source),
        fields(dst = ?self.region, mode = ?self.blend_mode)
    )]
    pub fn draw<H>(
        &self,
        ctx: &mut RenderContext<S, H>,
        source: &SurfaceRegion<S>,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
    ) -> TesseraResult<()>
    where
        H: FilterGraphHost<Node = S::FilterNode>,
    {
        let dst_shared = self.shared();
        let src_shared = source.shared();
        let dst_rect = Region::new(x, y, w, h).offset(self.region.x, self.region.y);
        let src_rect = source.region.with_size(w, h);
        let local = Region::new(0, 0, w, h);

        dst_shared
            .target
            .borrow_mut()
            .set_transform(Affine::IDENTITY);

        let emulate = ctx
            .caps
            .should_emulate_blend(self.blend_mode, dst_shared.width, dst_shared.height);
        let blend = Draw {
            mode: self.blend_mode,
            emulate,
            dst_rect,
        };

        if Rc::ptr_eq(&dst_shared, &src_shared) {
            tracing::debug!("source shares the backing surface, copying through scratch");
            let scratch = {
                let target = dst_shared.target.borrow();
                let scratch = ctx.scratch.copy.ensure(&*target, w, h, &mut ctx.stats)?;
                scratch.clear_rect(local);
                scratch.draw_image(&*target, src_rect, local)?;
                scratch
            };
            ctx.stats.scratch_copies += 1;

            let mut dst = dst_shared.target.borrow_mut();
            blend.run(
                &mut ctx.scratch.blend,
                &mut ctx.stats,
                &mut *dst,
                scratch,
                local,
            )
        } else {
            let src = src_shared.target.borrow();
            let mut dst = dst_shared.target.borrow_mut();
            blend.run(
                &mut ctx.scratch.blend,
                &mut ctx.stats,
                &mut *dst,
                &*src,
                src_rect,
            )
        }
    }

    /// Applies the effects of one draw call to the backing surface, see
    /// [`crate::EffectPipeline::apply_filters`].
    pub fn apply_filters<H>(
        &self,
        ctx: &mut RenderContext<S, H>,
        ratio: f64,
        filters: &[Filter],
    ) -> TesseraResult<FilterOutcome>
    where
        H: FilterGraphHost<Node = S::FilterNode>,
    {
        let shared = self.shared();
        let mut target = shared.target.borrow_mut();
        let outcome = ctx.effects.apply_filters(&mut *target, ratio, filters)?;
        count_outcome(&mut ctx.stats, outcome);
        Ok(outcome)
    }

    pub fn apply_color_matrix<H>(
        &self,
        ctx: &mut RenderContext<S, H>,
        matrix: &ColorMatrix,
    ) -> TesseraResult<FilterOutcome>
    where
        H: FilterGraphHost<Node = S::FilterNode>,
    {
        let shared = self.shared();
        let mut target = shared.target.borrow_mut();
        let outcome = ctx.effects.apply_color_matrix(&mut *target, matrix)?;
        count_outcome(&mut ctx.stats, outcome);
        Ok(outcome)
    }

    pub fn clear_filter<H>(&self, ctx: &RenderContext<S, H>)
    where
        H: FilterGraphHost<Node = S::FilterNode>,
    {
        let shared = self.shared();
        let mut target = shared.target.borrow_mut();
        ctx.effects.clear_filter(&mut *target);
    }
}

fn count_outcome(stats: &mut RenderStats, outcome: FilterOutcome) {
    match outcome {
        FilterOutcome::None => {}
        FilterOutcome::Skipped => stats.filters_skipped += 1,
        FilterOutcome::Native | FilterOutcome::AlphaOnly | FilterOutcome::Software => {
            stats.filters_applied += 1
        }
    }
}

// Final composite of an already-resolved source into the destination.
struct Draw {
    mode: BlendMode,
    emulate: bool,
    dst_rect: Region,
}

impl Draw {
    fn run<S: DrawingSurface>(
        &self,
        scratch: &mut ScratchSurface<S>,
        stats: &mut RenderStats,
        dst: &mut S,
        src: &S,
        src_rect: Region,
    ) -> TesseraResult<()> {
        if !self.emulate {
            dst.draw_image(src, src_rect, self.dst_rect)?;
            stats.direct_draws += 1;
            return Ok(());
        }

        tracing::debug!(mode = ?self.mode, "emulating slow blend mode through scratch");
        let (w, h) = (self.dst_rect.w, self.dst_rect.h);
        let local = Region::new(0, 0, w, h);
        let blend = scratch.ensure(dst, w, h, stats)?;

        // Seed with the destination pixels, then blend the source on top in isolation.
        blend.clear_rect(local);
        blend.draw_image(dst, self.dst_rect, local)?;
        blend.set_composite_operator(to_composite_operator(self.mode));
        blend.set_global_alpha(dst.global_alpha());
        blend.set_filter(dst.filter());
        blend.set_color_matrix_override(dst.color_matrix_override());
        blend.draw_image(src, src_rect, local)?;

        let saved = SavedDrawState::take(dst);
        dst.clear_rect(self.dst_rect);
        let res = dst.draw_image(blend, local, self.dst_rect);
        saved.restore(dst);
        res?;

        stats.emulated_blends += 1;
        Ok(())
    }
}

// Destination draw state parked while the blended scratch is copied back.
struct SavedDrawState<N> {
    op: CompositeOperator,
    alpha: f32,
    filter: Option<N>,
    matrix: Option<ColorMatrix>,
}

impl<N> SavedDrawState<N> {
    fn take<S: DrawingSurface<FilterNode = N>>(dst: &mut S) -> Self {
        let saved = Self {
            op: dst.composite_operator(),
            alpha: dst.global_alpha(),
            filter: dst.filter(),
            matrix: dst.color_matrix_override(),
        };
        reset_draw_state(dst);
        saved
    }

    fn restore<S: DrawingSurface<FilterNode = N>>(self, dst: &mut S) {
        dst.set_composite_operator(self.op);
        dst.set_global_alpha(self.alpha);
        dst.set_filter(self.filter);
        dst.set_color_matrix_override(self.matrix);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
