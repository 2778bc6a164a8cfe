use crate::animation::timeline::Timeline;
use crate::foundation::core::{PlayDirection, ScrollDirection, ScrollRange};
use crate::foundation::ids::BindingKey;
use crate::scroll::frame::ScrollFrame;
use crate::stage::Stage;
use crate::trigger::range::RangeSpec;

/// How displayed scrub progress follows the scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrubSmoothing {
    /// Progress tracks the position exactly.
    #[default]
    Immediate,
    /// Progress eases toward the position with a time constant in seconds.
    Lagged {
        /// Time constant, seconds.
        secs: f64,
    },
}

/// How a binding reacts to the scroll position.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingMode {
    /// Progress through the range drives the target.
    Scrub(ScrubSmoothing),
    /// Entering plays forward, leaving backwards plays in reverse.
    Toggle,
    /// Like `Scrub`, for pinned segments that hold their container in place.
    Pin(ScrubSmoothing),
    /// The target sees every frame while the position is inside the range.
    Observe,
}

impl BindingMode {
    /// Smoothing of a progress-tracking mode.
    pub fn smoothing(&self) -> Option<ScrubSmoothing> {
        match self {
            Self::Scrub(s) | Self::Pin(s) => Some(*s),
            Self::Toggle | Self::Observe => None,
        }
    }
}

/// Everything a target may look at or write during a callback.
pub struct BindingCtx<'a> {
    /// Frame being fanned out.
    pub frame: &'a ScrollFrame,
    /// Scroll direction for this frame. Zero velocity resolves to the side the
    /// position moved toward.
    pub direction: ScrollDirection,
    /// Range the binding currently resolves to.
    pub range: ScrollRange,
    /// Visual output.
    pub stage: &'a mut Stage,
}

/// Receiver of a binding's lifecycle callbacks.
///
/// Every method has an empty default so targets only implement what they use.
/// `on_progress` must be idempotent: the same `p` always produces the same
/// visual state.
pub trait BindingTarget {
    /// Called once before the first frame reaches the target, to establish its
    /// starting visual state.
    fn prime(&mut self, _stage: &mut Stage) {}

    /// The position moved into the range.
    fn on_enter(&mut self, _ctx: &mut BindingCtx<'_>) {}

    /// The position moved out of the range.
    fn on_leave(&mut self, _ctx: &mut BindingCtx<'_>) {}

    /// New progress in `[0, 1]` (scrub and pin modes).
    fn on_progress(&mut self, _p: f64, _ctx: &mut BindingCtx<'_>) {}

    /// Start direct playback (toggle mode).
    fn on_toggle(&mut self, _direction: PlayDirection, _ctx: &mut BindingCtx<'_>) {}

    /// Every frame while inside the range (observe mode).
    fn on_update(&mut self, _ctx: &mut BindingCtx<'_>) {}

    /// Wall-clock step, called every tick regardless of the range.
    fn advance(&mut self, _dt_ms: f64, _stage: &mut Stage) {}
}

/// A keyed range with a mode and a target.
pub struct TriggerBinding {
    /// Unique key.
    pub key: BindingKey,
    /// Range the binding watches.
    pub range: RangeSpec,
    /// Reaction mode.
    pub mode: BindingMode,
    /// Callback receiver.
    pub target: Box<dyn BindingTarget>,
}

impl TriggerBinding {
    /// Bundle a binding.
    pub fn new(
        key: impl Into<BindingKey>,
        range: RangeSpec,
        mode: BindingMode,
        target: impl BindingTarget + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            range,
            mode,
            target: Box::new(target),
        }
    }
}

impl std::fmt::Debug for TriggerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerBinding")
            .field("key", &self.key)
            .field("range", &self.range)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Drives a [`Timeline`] from a binding: scrubbed by progress, played by
/// toggles.
#[derive(Debug)]
pub struct TimelineTarget {
    timeline: Timeline,
}

impl TimelineTarget {
    /// Wrap a built timeline.
    pub fn new(timeline: Timeline) -> Self {
        Self { timeline }
    }

    /// The wrapped timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

impl BindingTarget for TimelineTarget {
    fn prime(&mut self, stage: &mut Stage) {
        self.timeline.render(stage);
    }

    fn on_progress(&mut self, p: f64, ctx: &mut BindingCtx<'_>) {
        self.timeline.seek(p, ctx.stage);
    }

    fn on_toggle(&mut self, direction: PlayDirection, _ctx: &mut BindingCtx<'_>) {
        self.timeline.play(direction);
    }

    fn advance(&mut self, dt_ms: f64, stage: &mut Stage) {
        for cue in self.timeline.advance(dt_ms, stage) {
            tracing::trace!(cue = self.timeline.cue_name(cue), "timeline cue");
        }
    }
}

type FrameFn = Box<dyn FnMut(&ScrollFrame)>;

/// Closure-backed target for host code that reacts to ranges without writing
/// visual state.
#[derive(Default)]
pub struct CallbackTarget {
    enter: Option<FrameFn>,
    leave: Option<FrameFn>,
    update: Option<FrameFn>,
    progress: Option<Box<dyn FnMut(f64)>>,
    toggle: Option<Box<dyn FnMut(PlayDirection)>>,
}

impl CallbackTarget {
    /// Target with no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on enter.
    pub fn when_enter(mut self, f: impl FnMut(&ScrollFrame) + 'static) -> Self {
        self.enter = Some(Box::new(f));
        self
    }

    /// Run `f` on leave.
    pub fn when_leave(mut self, f: impl FnMut(&ScrollFrame) + 'static) -> Self {
        self.leave = Some(Box::new(f));
        self
    }

    /// Run `f` on every observed frame.
    pub fn when_update(mut self, f: impl FnMut(&ScrollFrame) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Run `f` on progress.
    pub fn when_progress(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Run `f` on toggles.
    pub fn when_toggle(mut self, f: impl FnMut(PlayDirection) + 'static) -> Self {
        self.toggle = Some(Box::new(f));
        self
    }
}

impl BindingTarget for CallbackTarget {
    fn on_enter(&mut self, ctx: &mut BindingCtx<'_>) {
        if let Some(f) = &mut self.enter {
            f(ctx.frame);
        }
    }

    fn on_leave(&mut self, ctx: &mut BindingCtx<'_>) {
        if let Some(f) = &mut self.leave {
            f(ctx.frame);
        }
    }

    fn on_progress(&mut self, p: f64, _ctx: &mut BindingCtx<'_>) {
        if let Some(f) = &mut self.progress {
            f(p);
        }
    }

    fn on_toggle(&mut self, direction: PlayDirection, _ctx: &mut BindingCtx<'_>) {
        if let Some(f) = &mut self.toggle {
            f(direction);
        }
    }

    fn on_update(&mut self, ctx: &mut BindingCtx<'_>) {
        if let Some(f) = &mut self.update {
            f(ctx.frame);
        }
    }
}
