use crate::animation::ease::Ease;
use crate::config::ScrollerConfig;
use crate::foundation::error::CineResult;
use crate::foundation::ids::FrameCallbackId;
use crate::foundation::math::lerp;
use crate::host::HostEnv;
use crate::scroll::frame::{InputEvent, ScrollFrame};
use crate::scroll::velocity::VelocityTracker;

/// Nominal display frame used to normalize the per-tick lerp factor.
const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

/// Lifecycle of a [`VirtualScroller`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ScrollerState {
    /// Constructed, not producing frames. Input is dropped.
    Idle,
    /// Smoothing input toward the accumulated target.
    Running,
    /// Reduced motion: the native position is passed through verbatim.
    FollowingNative,
    /// Torn down. Terminal.
    Stopped,
}

type FrameCallback = Box<dyn FnMut(&ScrollFrame)>;

#[derive(Clone, Copy, Debug)]
struct Correction {
    from: f64,
    to: f64,
    start_ms: f64,
    duration_ms: f64,
    ease: Ease,
}

impl Correction {
    /// Eased position at `now_ms` and whether the tween has finished.
    fn sample(&self, now_ms: f64) -> (f64, bool) {
        let t = ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0);
        (lerp(self.from, self.to, self.ease.apply(t)), t >= 1.0)
    }
}

/// Owner of the canonical virtual scroll position.
///
/// Input accumulates between ticks; each [`tick`](Self::tick) folds it into the
/// target, eases the position toward it, clamps to `[0, extent]` and produces
/// exactly one [`ScrollFrame`]. Nothing else mutates the position.
pub struct VirtualScroller {
    cfg: ScrollerConfig,
    env: HostEnv,
    state: ScrollerState,
    extent_px: f64,
    position_px: f64,
    target_px: f64,
    pending_delta_px: f64,
    pending_native_px: Option<f64>,
    last_tick_ms: Option<f64>,
    velocity: VelocityTracker,
    correction: Option<Correction>,
    callbacks: Vec<(FrameCallbackId, FrameCallback)>,
    next_callback: u64,
}

impl VirtualScroller {
    /// Build an idle scroller over `[0, extent_px]`.
    pub fn new(cfg: ScrollerConfig, env: HostEnv, extent_px: f64) -> CineResult<Self> {
        let velocity = VelocityTracker::new(cfg.velocity_smoothing, cfg.max_frame_dt_ms)?;
        Ok(Self {
            cfg,
            env,
            state: ScrollerState::Idle,
            extent_px: sanitize_extent(extent_px),
            position_px: 0.0,
            target_px: 0.0,
            pending_delta_px: 0.0,
            pending_native_px: None,
            last_tick_ms: None,
            velocity,
            correction: None,
            callbacks: Vec::new(),
            next_callback: 0,
        })
    }

    /// Begin smoothing. A no-op under reduced motion or once stopped.
    pub fn start(&mut self) {
        if self.env.reduced_motion || self.state != ScrollerState::Idle {
            return;
        }
        tracing::debug!(position_px = self.position_px, "virtual scroller started");
        self.state = ScrollerState::Running;
    }

    /// Pass native scroll positions through without smoothing.
    pub fn follow_native(&mut self) {
        if self.state == ScrollerState::Stopped {
            return;
        }
        tracing::debug!("virtual scroller following native scroll");
        self.state = ScrollerState::FollowingNative;
        self.correction = None;
        self.velocity.reset();
    }

    /// Tear down: drop callbacks and produce no further frames. Idempotent.
    pub fn stop(&mut self) {
        if self.state == ScrollerState::Stopped {
            return;
        }
        tracing::debug!("virtual scroller stopped");
        self.state = ScrollerState::Stopped;
        self.callbacks.clear();
        self.correction = None;
        self.pending_delta_px = 0.0;
        self.pending_native_px = None;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ScrollerState {
        self.state
    }

    /// Canonical virtual position, px.
    pub fn position(&self) -> f64 {
        self.position_px
    }

    /// Position the smoothing is heading toward, px.
    pub fn target(&self) -> f64 {
        self.target_px
    }

    /// Last smoothed velocity, px/ms.
    pub fn velocity(&self) -> f64 {
        self.velocity.velocity()
    }

    /// Scrollable extent, px.
    pub fn content_extent(&self) -> f64 {
        self.extent_px
    }

    /// True while an [`animate_to`](Self::animate_to) tween is in flight.
    pub fn is_correcting(&self) -> bool {
        self.correction.is_some()
    }

    /// Register a callback invoked with every produced frame, in registration order.
    pub fn on_frame(&mut self, cb: impl FnMut(&ScrollFrame) + 'static) -> FrameCallbackId {
        let id = FrameCallbackId(self.next_callback);
        self.next_callback += 1;
        self.callbacks.push((id, Box::new(cb)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn remove_frame_callback(&mut self, id: FrameCallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cb_id, _)| *cb_id != id);
        self.callbacks.len() != before
    }

    /// True once the position has caught up with the target and no
    /// correction is running.
    pub fn is_settled(&self) -> bool {
        self.correction.is_none() && self.position_px == self.target_px && self.pending_delta_px == 0.0
    }

    /// Queue raw input for the next tick. Ignored unless the scroller is active.
    pub fn push_input(&mut self, input: InputEvent) {
        match self.state {
            ScrollerState::Idle | ScrollerState::Stopped => return,
            ScrollerState::Running | ScrollerState::FollowingNative => {}
        }
        if input.is_continuous() {
            self.correction = None;
        }
        match input {
            InputEvent::Wheel { delta_px } if delta_px.is_finite() => {
                self.pending_delta_px += delta_px * self.cfg.wheel_multiplier;
            }
            InputEvent::Touch { delta_px } if delta_px.is_finite() => {
                self.pending_delta_px += delta_px * self.cfg.touch_multiplier;
            }
            InputEvent::Native { position_px } if position_px.is_finite() => {
                self.pending_native_px = Some(position_px);
            }
            _ => {}
        }
    }

    /// Update the scrollable extent, re-clamping position and target.
    pub fn set_content_extent(&mut self, extent_px: f64) {
        self.extent_px = sanitize_extent(extent_px);
        self.target_px = self.target_px.clamp(0.0, self.extent_px);
        self.position_px = self.position_px.clamp(0.0, self.extent_px);
        if let Some(c) = &mut self.correction {
            c.to = c.to.clamp(0.0, self.extent_px);
        }
    }

    /// Start an eased correction toward `target_px`. Any user input cancels it;
    /// a later call replaces it. Ignored unless smoothing is running.
    pub fn animate_to(&mut self, target_px: f64, duration_ms: f64, ease: Ease, now_ms: f64) {
        if self.state != ScrollerState::Running || !target_px.is_finite() {
            return;
        }
        let to = target_px.clamp(0.0, self.extent_px);
        if !(duration_ms > 0.0) {
            self.correction = None;
            self.target_px = to;
            self.position_px = to;
            return;
        }
        self.pending_delta_px = 0.0;
        self.correction = Some(Correction {
            from: self.position_px,
            to,
            start_ms: now_ms,
            duration_ms,
            ease,
        });
    }

    /// Advance one display frame. Returns `None` when idle or stopped.
    pub fn tick(&mut self, now_ms: f64) -> Option<ScrollFrame> {
        let dt_ms = match self.last_tick_ms {
            Some(prev) => (now_ms - prev).clamp(0.0, self.cfg.max_frame_dt_ms),
            None => NOMINAL_FRAME_MS,
        };
        self.last_tick_ms = Some(now_ms);

        let frame = match self.state {
            ScrollerState::Idle | ScrollerState::Stopped => return None,
            ScrollerState::FollowingNative => self.tick_native(now_ms),
            ScrollerState::Running => self.tick_smooth(now_ms, dt_ms),
        };

        for (_, cb) in &mut self.callbacks {
            cb(&frame);
        }
        Some(frame)
    }

    fn tick_native(&mut self, now_ms: f64) -> ScrollFrame {
        let prev = self.position_px;
        let native = self.pending_native_px.take().unwrap_or(prev);
        // Native scrolling still reports wheel deltas; they are informational.
        let raw = std::mem::take(&mut self.pending_delta_px);
        self.position_px = native.clamp(0.0, self.extent_px);
        self.target_px = self.position_px;
        ScrollFrame {
            timestamp_ms: now_ms,
            raw_delta_px: if raw != 0.0 { raw } else { self.position_px - prev },
            virtual_position_px: self.position_px,
            velocity_px_per_ms: 0.0,
        }
    }

    fn tick_smooth(&mut self, now_ms: f64, dt_ms: f64) -> ScrollFrame {
        let prev = self.position_px;
        let raw = std::mem::take(&mut self.pending_delta_px);

        if let Some(native) = self.pending_native_px.take() {
            // Scrollbar drag or keyboard jump: adopt it without smoothing.
            self.target_px = native.clamp(0.0, self.extent_px);
            self.position_px = self.target_px;
        } else if let Some(c) = self.correction {
            let (pos, done) = c.sample(now_ms);
            self.position_px = pos;
            self.target_px = pos;
            if done {
                self.correction = None;
            }
        } else {
            self.target_px = (self.target_px + raw).clamp(0.0, self.extent_px);
            let alpha = frame_lerp(self.cfg.lerp, dt_ms);
            self.position_px += (self.target_px - self.position_px) * alpha;
            if (self.target_px - self.position_px).abs() < self.cfg.settle_epsilon_px {
                self.position_px = self.target_px;
            }
        }
        self.position_px = self.position_px.clamp(0.0, self.extent_px);

        let velocity = self.velocity.observe(self.position_px - prev, dt_ms);
        ScrollFrame {
            timestamp_ms: now_ms,
            raw_delta_px: raw,
            virtual_position_px: self.position_px,
            velocity_px_per_ms: velocity,
        }
    }
}

impl std::fmt::Debug for VirtualScroller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualScroller")
            .field("state", &self.state)
            .field("position_px", &self.position_px)
            .field("target_px", &self.target_px)
            .field("extent_px", &self.extent_px)
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

/// Lerp factor for a tick of `dt_ms`, equal to `lerp` at 60 Hz.
fn frame_lerp(lerp: f64, dt_ms: f64) -> f64 {
    if lerp >= 1.0 {
        return 1.0;
    }
    if !(dt_ms > 0.0) {
        return 0.0;
    }
    1.0 - (1.0 - lerp).powf(dt_ms / NOMINAL_FRAME_MS)
}

fn sanitize_extent(px: f64) -> f64 {
    if px.is_finite() { px.max(0.0) } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/scroller.rs"]
mod tests;
