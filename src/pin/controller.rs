use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::props::Prop;
use crate::config::PinConfig;
use crate::foundation::core::{ScrollDirection, ScrollRange};
use crate::foundation::error::CineResult;
use crate::foundation::ids::{BindingHandle, BindingKey, ClaimOwner, RegionId};
use crate::host::LayoutSource;
use crate::pin::segment::{PinSegment, SceneWidth, SceneWindow};
use crate::scroll::frame::ScrollFrame;
use crate::stage::Stage;
use crate::trigger::binding::{BindingCtx, BindingMode, BindingTarget, ScrubSmoothing, TriggerBinding};
use crate::trigger::range::{RangeEnd, RangeSpec, ScrollAnchor};
use crate::trigger::registry::TriggerRegistry;

/// A binding that follows the horizontal position inside one scene.
pub struct DetailBinding {
    /// Key, unique within the segment.
    pub key: BindingKey,
    /// Horizontal window of the scene the binding is active in.
    pub window: SceneWindow,
    /// Reaction mode.
    pub mode: BindingMode,
    /// Callback receiver.
    pub target: Box<dyn BindingTarget>,
}

impl DetailBinding {
    /// Bundle a detail binding.
    pub fn new(
        key: impl Into<BindingKey>,
        window: SceneWindow,
        mode: BindingMode,
        target: impl BindingTarget + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            window,
            mode,
            target: Box::new(target),
        }
    }
}

/// One scene of a pinned segment.
pub struct SceneDef {
    /// Width of the scene.
    pub width: SceneWidth,
    /// Bindings driven by the horizontal position while this scene is visible.
    pub details: Vec<DetailBinding>,
}

impl SceneDef {
    /// Scene without detail bindings.
    pub fn new(width: SceneWidth) -> Self {
        Self {
            width,
            details: Vec::new(),
        }
    }

    /// Add a detail binding.
    pub fn detail(mut self, detail: DetailBinding) -> Self {
        self.details.push(detail);
        self
    }
}

/// Everything needed to attach a pinned segment.
pub struct PinDef {
    /// Container region held in place.
    pub container: RegionId,
    /// Scenes left to right.
    pub scenes: Vec<SceneDef>,
    /// Region whose `ScaleX` mirrors pin progress.
    pub progress_region: Option<RegionId>,
    /// How the track follows the scroll position. The container's hold
    /// (`PinY`) always follows it exactly.
    pub scrub: ScrubSmoothing,
}

impl PinDef {
    /// Segment over `container` with no scenes yet.
    pub fn new(container: impl Into<RegionId>) -> Self {
        Self {
            container: container.into(),
            scenes: Vec::new(),
            progress_region: None,
            scrub: ScrubSmoothing::Immediate,
        }
    }

    /// Append a scene.
    pub fn scene(mut self, scene: SceneDef) -> Self {
        self.scenes.push(scene);
        self
    }

    /// Set the progress indicator region.
    pub fn progress_region(mut self, region: impl Into<RegionId>) -> Self {
        self.progress_region = Some(region.into());
        self
    }

    /// Set how the track follows the scroll position.
    pub fn scrub(mut self, scrub: ScrubSmoothing) -> Self {
        self.scrub = scrub;
        self
    }
}

struct DetailSlot {
    scene: usize,
    window: SceneWindow,
    handle: BindingHandle,
}

/// State shared between the controller and its registry binding.
struct PinCore {
    segment: PinSegment,
    widths: Vec<SceneWidth>,
    progress_region: Option<RegionId>,
    owner: ClaimOwner,
    range: Option<ScrollRange>,
    offset_px: f64,
    progress: f64,
    inside: bool,
    last_direction: ScrollDirection,
    details: TriggerRegistry,
    slots: Vec<DetailSlot>,
}

impl PinCore {
    /// Progress shown on the track. Zero when there is no headroom.
    fn horizontal_progress(&self) -> f64 {
        if self.segment.total_horizontal_extent_px > 0.0 {
            self.progress.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn write(&self, stage: &mut Stage) {
        let hp = self.horizontal_progress();
        let container = &self.segment.container;
        stage.set_owned(self.owner, container, Prop::X, -self.segment.horizontal_offset_px(hp));
        stage.set_owned(self.owner, container, Prop::PinY, self.offset_px);
        if let Some(region) = &self.progress_region {
            stage.set_owned(self.owner, region, Prop::ScaleX, hp);
        }
    }

    /// Feed the details a frame positioned on the horizontal track.
    fn drive_details(&mut self, frame: &ScrollFrame, stage: &mut Stage) {
        let horizontal = ScrollFrame {
            virtual_position_px: self.segment.horizontal_offset_px(self.horizontal_progress()),
            ..*frame
        };
        self.details.update(&horizontal, stage);
    }

    fn resolve_details(&mut self, layout: &dyn LayoutSource) {
        let viewport_width = self.segment.viewport_width_px;
        for slot in &self.slots {
            if let Some(scene) = self.segment.scenes.get(slot.scene) {
                let range = slot.window.resolve(scene, viewport_width);
                self.details.set_range(slot.handle, RangeSpec::Absolute(range), layout);
            }
        }
    }
}

/// Registry-side half of a pinned segment.
struct PinTarget {
    core: Rc<RefCell<PinCore>>,
}

impl BindingTarget for PinTarget {
    fn prime(&mut self, stage: &mut Stage) {
        self.core.borrow().write(stage);
    }

    fn on_enter(&mut self, _ctx: &mut BindingCtx<'_>) {
        self.core.borrow_mut().inside = true;
    }

    fn on_leave(&mut self, _ctx: &mut BindingCtx<'_>) {
        self.core.borrow_mut().inside = false;
    }

    fn on_progress(&mut self, p: f64, ctx: &mut BindingCtx<'_>) {
        let mut core = self.core.borrow_mut();
        core.range = Some(ctx.range);
        core.progress = p;
        // The hold follows the frame even when the track lags behind it.
        core.offset_px = (ctx.frame.virtual_position_px - ctx.range.start).clamp(0.0, ctx.range.len());
        if ctx.direction != ScrollDirection::Still {
            core.last_direction = ctx.direction;
        }
        core.write(ctx.stage);
        core.drive_details(ctx.frame, ctx.stage);
    }

    fn advance(&mut self, dt_ms: f64, stage: &mut Stage) {
        self.core.borrow_mut().details.advance(dt_ms, stage);
    }
}

/// Holds a container in place while vertical scroll drives a horizontal track
/// of scenes, with snapping between scenes.
///
/// The controller is the only writer of its container's `X` and `PinY`
/// channels (and of the progress region's `ScaleX`) for as long as it is
/// attached.
pub struct PinnedSegmentController {
    core: Rc<RefCell<PinCore>>,
    key: BindingKey,
    handle: Option<BindingHandle>,
}

impl PinnedSegmentController {
    /// Measure the segment, claim its channels and register its pin binding.
    ///
    /// Fails with a conflict if another controller owns the container. A
    /// container missing from the layout yields an inert controller.
    #[tracing::instrument(level = "debug", skip_all, fields(container = %def.container))]
    pub fn attach(
        def: PinDef,
        cfg: &PinConfig,
        registry: &mut TriggerRegistry,
        stage: &mut Stage,
        layout: &dyn LayoutSource,
    ) -> CineResult<Self> {
        let owner = stage.new_owner();
        let claimed = claim_all(stage, owner, &def.container, def.progress_region.as_ref());
        if let Err(err) = claimed {
            stage.release(owner);
            return Err(err);
        }

        let widths: Vec<SceneWidth> = def.scenes.iter().map(|s| s.width.clone()).collect();
        let settle = cfg.settle_buffer.resolve(layout.viewport().height);
        let segment = PinSegment::measure(def.container.clone(), &widths, layout, settle);
        tracing::debug!(
            scenes = segment.scenes.len(),
            total_px = segment.total_horizontal_extent_px,
            settle_px = segment.settle_buffer_px,
            "pinned segment measured"
        );

        let mut details = TriggerRegistry::new();
        let mut slots = Vec::new();
        for (scene_idx, scene) in def.scenes.into_iter().enumerate() {
            let Some(geometry) = segment.scenes.get(scene_idx).copied() else {
                continue;
            };
            for detail in scene.details {
                let range = detail.window.resolve(&geometry, segment.viewport_width_px);
                let binding = TriggerBinding {
                    key: detail.key,
                    range: RangeSpec::Absolute(range),
                    mode: detail.mode,
                    target: detail.target,
                };
                let registered = details.register(binding, layout);
                let handle = match registered {
                    Ok(Some(handle)) => handle,
                    Ok(None) => continue,
                    Err(err) => {
                        stage.release(owner);
                        return Err(err);
                    }
                };
                slots.push(DetailSlot {
                    scene: scene_idx,
                    window: detail.window,
                    handle,
                });
            }
        }

        let key = BindingKey::new(format!("pin:{}", def.container));
        let spec = pin_range(&segment);
        let core = Rc::new(RefCell::new(PinCore {
            segment,
            widths,
            progress_region: def.progress_region,
            owner,
            range: None,
            offset_px: 0.0,
            progress: 0.0,
            inside: false,
            last_direction: ScrollDirection::Still,
            details,
            slots,
        }));

        let binding = TriggerBinding {
            key: key.clone(),
            range: spec,
            mode: BindingMode::Pin(def.scrub),
            target: Box::new(PinTarget {
                core: Rc::clone(&core),
            }),
        };
        let handle = match registry.register(binding, layout) {
            Ok(handle) => handle,
            Err(err) => {
                stage.release(owner);
                return Err(err);
            }
        };
        if let Some(handle) = handle {
            core.borrow_mut().range = registry.range(handle);
        }
        Ok(Self { core, key, handle })
    }

    /// False when the container was not on the page at attach time.
    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Key of the pin binding in the outer registry.
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// Current measured geometry.
    pub fn segment(&self) -> PinSegment {
        self.core.borrow().segment.clone()
    }

    /// Progress shown on the track, `[0, 1]` over travel plus settle.
    pub fn horizontal_progress(&self) -> f64 {
        self.core.borrow().horizontal_progress()
    }

    /// Outer scroll range the container is pinned for.
    pub fn range(&self) -> Option<ScrollRange> {
        self.core.borrow().range
    }

    /// Invalidate and recompute extent, ranges and snap points.
    #[tracing::instrument(level = "debug", skip_all, fields(key = %self.key))]
    pub fn remeasure(&self, cfg: &PinConfig, registry: &mut TriggerRegistry, layout: &dyn LayoutSource) {
        let mut core = self.core.borrow_mut();
        let settle = cfg.settle_buffer.resolve(layout.viewport().height);
        let container = core.segment.container.clone();
        let segment = PinSegment::measure(container, &core.widths, layout, settle);
        core.segment = segment;
        core.resolve_details(layout);
        tracing::debug!(
            total_px = core.segment.total_horizontal_extent_px,
            snaps = core.segment.snap_points.len(),
            "pinned segment remeasured"
        );
        if let Some(handle) = self.handle {
            let spec = pin_range(&core.segment);
            registry.set_range(handle, spec, layout);
            core.range = registry.range(handle);
        }
    }

    /// Scroll position to settle on after continuous input stops, or `None`
    /// when the position is outside the segment or already on a scene.
    ///
    /// Snapping works on the scroll position itself, not on a lagging track.
    pub fn release(&self) -> Option<f64> {
        let core = self.core.borrow();
        if !core.inside {
            return None;
        }
        let range = core.range?;
        let scrolled = core.segment.progress_at(core.offset_px);
        let snap = core.segment.nearest_snap(scrolled, core.last_direction)?;
        let target = range.start + snap * range.len();
        tracing::debug!(snap, target_px = target, direction = ?core.last_direction, "pin snap");
        Some(target)
    }

    /// Unregister the pin binding and give up the claimed channels.
    pub fn detach(self, registry: &mut TriggerRegistry, stage: &mut Stage) {
        if let Some(handle) = self.handle {
            registry.unregister(handle);
        }
        let mut core = self.core.borrow_mut();
        core.details.clear();
        stage.release(core.owner);
        tracing::debug!(key = %self.key, "pinned segment detached");
    }
}

impl std::fmt::Debug for PinnedSegmentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinnedSegmentController")
            .field("key", &self.key)
            .field("handle", &self.handle)
            .field("segment", &self.core.borrow().segment)
            .finish()
    }
}

/// Container top meets viewport top, held for the horizontal travel plus the
/// settle stretch.
fn pin_range(segment: &PinSegment) -> RangeSpec {
    RangeSpec::Anchored {
        region: segment.container.clone(),
        start: ScrollAnchor::TOP_TOP,
        end: RangeEnd::Length(segment.pinned_length_px()),
    }
}

fn claim_all(
    stage: &mut Stage,
    owner: ClaimOwner,
    container: &RegionId,
    progress_region: Option<&RegionId>,
) -> CineResult<()> {
    stage.claim(container, Prop::X, owner)?;
    stage.claim(container, Prop::PinY, owner)?;
    if let Some(region) = progress_region {
        stage.claim(region, Prop::ScaleX, owner)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/pin/controller.rs"]
mod tests;
