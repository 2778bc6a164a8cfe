use crate::foundation::core::{PlayDirection, RangeSide, ScrollDirection, ScrollRange};
use crate::foundation::error::{CineError, CineResult};
use crate::foundation::ids::{BindingHandle, BindingKey};
use crate::foundation::math::lag_alpha;
use crate::host::LayoutSource;
use crate::scroll::frame::ScrollFrame;
use crate::stage::Stage;
use crate::trigger::binding::{BindingCtx, BindingMode, BindingTarget, ScrubSmoothing, TriggerBinding};
use crate::trigger::range::RangeSpec;

/// Lagged progress closer than this to its goal snaps onto it.
const LAG_SETTLE_EPSILON: f64 = 1e-4;

struct Entry {
    handle: BindingHandle,
    key: BindingKey,
    spec: RangeSpec,
    range: ScrollRange,
    mode: BindingMode,
    target: Box<dyn BindingTarget>,
    side: RangeSide,
    primed: bool,
    shown_p: f64,
    goal_p: f64,
}

impl Entry {
    fn prime(&mut self, stage: &mut Stage) {
        if !self.primed {
            self.primed = true;
            self.target.prime(stage);
        }
    }

    fn lag_secs(&self) -> Option<f64> {
        match self.mode.smoothing() {
            Some(ScrubSmoothing::Lagged { secs }) if secs > 0.0 => Some(secs),
            _ => None,
        }
    }

    fn tracks_progress(&self) -> bool {
        self.mode.smoothing().is_some()
    }

    /// Deliver progress now, or record it as the goal of a lagged scrub or pin.
    fn progress(&mut self, p: f64, ctx: &mut BindingCtx<'_>) {
        if !self.tracks_progress() {
            return;
        }
        self.goal_p = p;
        if self.lag_secs().is_none() {
            self.shown_p = p;
            self.target.on_progress(p, ctx);
        }
    }

    fn enter(&mut self, ctx: &mut BindingCtx<'_>) {
        self.target.on_enter(ctx);
        if self.mode == BindingMode::Toggle && ctx.direction == ScrollDirection::Forward {
            self.target.on_toggle(PlayDirection::Forward, ctx);
        }
    }

    fn leave(&mut self, ctx: &mut BindingCtx<'_>) {
        self.target.on_leave(ctx);
        if self.mode == BindingMode::Toggle && ctx.direction == ScrollDirection::Backward {
            self.target.on_toggle(PlayDirection::Reverse, ctx);
        }
    }
}

/// Zero velocity (seeks, native scrolling) falls back to the side the position
/// moved toward.
fn frame_direction(frame: &ScrollFrame, prev: RangeSide, next: RangeSide) -> ScrollDirection {
    match frame.direction() {
        ScrollDirection::Still => match (prev, next) {
            (RangeSide::Before, RangeSide::Inside | RangeSide::After)
            | (RangeSide::Inside, RangeSide::After) => ScrollDirection::Forward,
            (RangeSide::After, RangeSide::Inside | RangeSide::Before)
            | (RangeSide::Inside, RangeSide::Before) => ScrollDirection::Backward,
            _ => ScrollDirection::Still,
        },
        moving => moving,
    }
}

/// Live set of range bindings, fanned out in registration order.
#[derive(Default)]
pub struct TriggerRegistry {
    entries: Vec<Entry>,
    next_handle: u64,
    last_frame: Option<ScrollFrame>,
}

impl TriggerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `key` is registered.
    pub fn contains_key(&self, key: &BindingKey) -> bool {
        self.entries.iter().any(|e| &e.key == key)
    }

    /// Handle of the binding registered under `key`.
    pub fn handle_of(&self, key: &BindingKey) -> Option<BindingHandle> {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.handle)
    }

    /// Add a binding.
    ///
    /// A key that is already registered is a programming error and fails. A
    /// range whose region is not on the page registers nothing and returns
    /// `Ok(None)`: the rest of the engine carries on without it.
    #[tracing::instrument(level = "debug", skip_all, fields(key = %binding.key))]
    pub fn register(
        &mut self,
        binding: TriggerBinding,
        layout: &dyn LayoutSource,
    ) -> CineResult<Option<BindingHandle>> {
        if self.contains_key(&binding.key) {
            return Err(CineError::duplicate_binding(binding.key.0));
        }
        if let Some(ScrubSmoothing::Lagged { secs }) = binding.mode.smoothing() {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(CineError::validation(format!(
                    "binding '{}': scrub lag must be finite and >= 0",
                    binding.key
                )));
            }
        }
        let Some(range) = binding.range.resolve(layout) else {
            tracing::debug!(region = ?binding.range.region(), "region missing; binding is inert");
            return Ok(None);
        };

        let handle = BindingHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!(start = range.start, end = range.end, ?handle, "binding registered");
        self.entries.push(Entry {
            handle,
            key: binding.key,
            spec: binding.range,
            range,
            mode: binding.mode,
            target: binding.target,
            side: RangeSide::Before,
            primed: false,
            shown_p: 0.0,
            goal_p: 0.0,
        });
        Ok(Some(handle))
    }

    /// Remove a binding. The target receives no further callbacks. Returns
    /// false if the handle was not live.
    pub fn unregister(&mut self, handle: BindingHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_frame = None;
    }

    /// Currently resolved range of a binding.
    pub fn range(&self, handle: BindingHandle) -> Option<ScrollRange> {
        self.entry(handle).map(|e| e.range)
    }

    /// Progress last delivered to a scrub or pin binding.
    pub fn progress(&self, handle: BindingHandle) -> Option<f64> {
        self.entry(handle).map(|e| e.shown_p)
    }

    fn entry(&self, handle: BindingHandle) -> Option<&Entry> {
        self.entries.iter().find(|e| e.handle == handle)
    }

    /// Replace a binding's range. Returns false if the handle is not live or
    /// the new range cannot be resolved (the old range is kept).
    pub fn set_range(&mut self, handle: BindingHandle, spec: RangeSpec, layout: &dyn LayoutSource) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.handle == handle) else {
            return false;
        };
        let Some(range) = spec.resolve(layout) else {
            return false;
        };
        entry.spec = spec;
        entry.range = range;
        true
    }

    /// Re-resolve every range against current layout. Bindings whose region
    /// disappeared keep their last range.
    #[tracing::instrument(level = "debug", skip_all, fields(bindings = self.entries.len()))]
    pub fn refresh(&mut self, layout: &dyn LayoutSource) {
        for entry in &mut self.entries {
            match entry.spec.resolve(layout) {
                Some(range) => entry.range = range,
                None => tracing::debug!(key = %entry.key, "region missing on refresh; range kept"),
            }
        }
    }

    /// Fan a frame out to every binding.
    pub fn update(&mut self, frame: &ScrollFrame, stage: &mut Stage) {
        self.last_frame = Some(*frame);
        let pos = frame.virtual_position_px;
        // Targets cannot reach the registry, so the entry list is stable for
        // the whole pass.
        for entry in &mut self.entries {
            entry.prime(stage);
            let prev = entry.side;
            let next = entry.range.side(pos);
            let mut ctx = BindingCtx {
                frame,
                direction: frame_direction(frame, prev, next),
                range: entry.range,
                stage: &mut *stage,
            };
            let p = entry.range.progress(pos);
            match (prev, next) {
                (RangeSide::Inside, RangeSide::Inside) => {
                    entry.progress(p, &mut ctx);
                }
                (_, RangeSide::Inside) => {
                    entry.enter(&mut ctx);
                    entry.progress(p, &mut ctx);
                }
                (RangeSide::Inside, _) => {
                    entry.progress(p, &mut ctx);
                    entry.leave(&mut ctx);
                }
                (RangeSide::Before, RangeSide::After) | (RangeSide::After, RangeSide::Before) => {
                    entry.enter(&mut ctx);
                    entry.progress(p, &mut ctx);
                    entry.leave(&mut ctx);
                }
                _ => {}
            }
            if next == RangeSide::Inside && entry.mode == BindingMode::Observe {
                entry.target.on_update(&mut ctx);
            }
            entry.side = next;
        }
    }

    /// Wall-clock step: eases lagged scrubs and pins toward their goal and lets every
    /// target run direct playback.
    pub fn advance(&mut self, dt_ms: f64, stage: &mut Stage) {
        let frame = self.last_frame;
        for entry in &mut self.entries {
            entry.prime(stage);
            if let (Some(secs), Some(frame)) = (entry.lag_secs(), frame.as_ref()) {
                if entry.shown_p != entry.goal_p {
                    let alpha = lag_alpha(dt_ms, secs);
                    let mut shown = entry.shown_p + (entry.goal_p - entry.shown_p) * alpha;
                    if (entry.goal_p - shown).abs() < LAG_SETTLE_EPSILON {
                        shown = entry.goal_p;
                    }
                    entry.shown_p = shown;
                    let mut ctx = BindingCtx {
                        frame,
                        direction: frame.direction(),
                        range: entry.range,
                        stage: &mut *stage,
                    };
                    entry.target.on_progress(shown, &mut ctx);
                }
            }
            entry.target.advance(dt_ms, stage);
        }
    }
}

impl std::fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (&e.key, e.range, e.mode)))
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/registry.rs"]
mod tests;
