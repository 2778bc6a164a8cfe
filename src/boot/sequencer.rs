use smallvec::SmallVec;

use crate::animation::ease::Ease;
use crate::animation::props::{Prop, Props};
use crate::animation::timeline::{StepPosition, Timeline, TimelineDescriptor, TweenStep, build_timeline};
use crate::config::BootConfig;
use crate::foundation::core::PlayDirection;
use crate::foundation::error::{CineError, CineResult};
use crate::foundation::ids::{CueId, RegionId};
use crate::host::HostEnv;
use crate::stage::Stage;

const UNLOCK_CUE: &str = "unlock";

/// Boot phases, entered strictly in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum BootState {
    /// Constructed, not started.
    Idle,
    /// Progress counter running (and, under reduced motion, the fade).
    Counting,
    /// Content exit and seam grow.
    Preparing,
    /// Two-panel wipe. Interaction is already unlocked.
    Splitting,
    /// Finished. Terminal.
    Done,
}

/// One-time lifecycle signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum BootSignal {
    /// The page may take input.
    InteractionUnlocked,
    /// The boot sequence has finished.
    Ready,
}

/// Regions the boot overlay is made of.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootRegions {
    /// Whole overlay (faded under reduced motion).
    pub overlay: RegionId,
    /// Centre content panel.
    pub content: RegionId,
    /// Vertical seam between the panels.
    pub seam: RegionId,
    /// Left wipe panel.
    pub left_panel: RegionId,
    /// Right wipe panel.
    pub right_panel: RegionId,
    /// Numeric progress counter.
    pub counter: RegionId,
}

impl Default for BootRegions {
    fn default() -> Self {
        Self {
            overlay: "loader".into(),
            content: "loader-content".into(),
            seam: "loader-seam".into(),
            left_panel: "loader-left".into(),
            right_panel: "loader-right".into(),
            counter: "loader-counter".into(),
        }
    }
}

/// One-shot intro sequence gating engine activation.
///
/// Time-driven: the host (or the engine) calls [`advance`](Self::advance) every
/// tick. Both signals fire exactly once, unlock strictly before ready, on the
/// full and the reduced-motion path alike.
#[derive(Debug)]
pub struct BootSequencer {
    timeline: Timeline,
    reduced_motion: bool,
    counter_secs: f64,
    counter_ease: Ease,
    unlock_cue: CueId,
    counter_end: f64,
    split_start: f64,
    state: BootState,
    elapsed_secs: f64,
    unlocked: bool,
}

impl BootSequencer {
    /// Build the sequence for `env`.
    pub fn new(cfg: &BootConfig, regions: &BootRegions, env: HostEnv) -> CineResult<Self> {
        let descriptor = if env.reduced_motion {
            reduced_descriptor(cfg, regions)
        } else {
            full_descriptor(cfg, regions)
        };
        let timeline = build_timeline(&descriptor)?;
        let unlock_cue = timeline
            .cue_id(UNLOCK_CUE)
            .ok_or_else(|| CineError::animation("boot timeline lost its unlock cue"))?;
        let split_start = timeline.cue_progress(unlock_cue).unwrap_or(1.0);
        let counter_end = cfg.counter_secs / timeline.duration_secs();
        Ok(Self {
            timeline,
            reduced_motion: env.reduced_motion,
            counter_secs: cfg.counter_secs,
            counter_ease: cfg.counter_ease,
            unlock_cue,
            counter_end,
            split_start,
            state: BootState::Idle,
            elapsed_secs: 0.0,
            unlocked: false,
        })
    }

    /// Current phase.
    pub fn state(&self) -> BootState {
        self.state
    }

    /// Total sequence length, seconds.
    pub fn duration_secs(&self) -> f64 {
        self.timeline.duration_secs()
    }

    /// True once interaction has been unlocked.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Zero-padded counter text, `"000"` to `"100"`.
    pub fn counter_text(&self) -> String {
        let t = if self.counter_secs > 0.0 {
            (self.elapsed_secs / self.counter_secs).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let value = (self.counter_ease.apply(t) * 100.0).round() as u32;
        format!("{value:03}")
    }

    /// Write the opening frame of the overlay.
    pub fn prime(&self, stage: &mut Stage) {
        self.timeline.render(stage);
    }

    /// `Idle → Counting`. Later calls do nothing.
    pub fn start(&mut self) {
        if self.state != BootState::Idle {
            return;
        }
        tracing::debug!(reduced_motion = self.reduced_motion, "boot: counting");
        self.state = BootState::Counting;
        self.timeline.play(PlayDirection::Forward);
    }

    /// Step the sequence by `dt_ms` and return the signals fired on the way.
    /// A no-op before `start` and after `Done`.
    pub fn advance(&mut self, dt_ms: f64, stage: &mut Stage) -> SmallVec<[BootSignal; 2]> {
        let mut signals = SmallVec::new();
        if matches!(self.state, BootState::Idle | BootState::Done) || !(dt_ms > 0.0) {
            return signals;
        }
        self.elapsed_secs += dt_ms / 1000.0;
        let cues = self.timeline.advance(dt_ms, stage);
        if !self.unlocked && cues.contains(&self.unlock_cue) {
            self.unlocked = true;
            tracing::debug!(elapsed_secs = self.elapsed_secs, "boot: interaction unlocked");
            signals.push(BootSignal::InteractionUnlocked);
        }

        let next = self.phase_at(self.timeline.progress());
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "boot transition");
            self.state = next;
        }
        if self.state == BootState::Done {
            if !self.unlocked {
                // Unlock always precedes ready.
                self.unlocked = true;
                signals.push(BootSignal::InteractionUnlocked);
            }
            tracing::debug!("boot: ready");
            signals.push(BootSignal::Ready);
        }
        signals
    }

    fn phase_at(&self, p: f64) -> BootState {
        if p >= 1.0 {
            BootState::Done
        } else if self.reduced_motion || p < self.counter_end {
            BootState::Counting
        } else if p < self.split_start {
            BootState::Preparing
        } else {
            BootState::Splitting
        }
    }
}

fn full_descriptor(cfg: &BootConfig, r: &BootRegions) -> TimelineDescriptor {
    TimelineDescriptor::new()
        .step(counter_step(cfg, r))
        .step(
            TweenStep::to(
                [r.content.clone()],
                Props::new().scale(0.9).opacity(0.0).blur(15.0),
            )
            .duration(cfg.content_exit_secs)
            .ease(cfg.content_exit_ease)
            .at(StepPosition::AfterPrevious(cfg.prepare_gap_secs)),
        )
        .step(
            TweenStep::to(
                [r.seam.clone()],
                Props::new().with(Prop::ScaleY, 1.0).opacity(1.0),
            )
            .from(Props::new().with(Prop::ScaleY, 0.0).opacity(0.0))
            .duration(cfg.seam_secs)
            .ease(cfg.seam_ease)
            .at(StepPosition::AfterPrevious(-cfg.seam_overlap_secs)),
        )
        .cue(UNLOCK_CUE, StepPosition::AfterPrevious(0.0))
        .step(
            TweenStep::to([r.left_panel.clone()], Props::new().with(Prop::XPercent, -100.0))
                .duration(cfg.split_secs)
                .ease(cfg.split_ease)
                .at(StepPosition::AfterPrevious(0.0)),
        )
        .step(
            TweenStep::to([r.right_panel.clone()], Props::new().with(Prop::XPercent, 100.0))
                .duration(cfg.split_secs)
                .ease(cfg.split_ease)
                .at(StepPosition::WithPrevious(0.0)),
        )
        .step(
            TweenStep::to(
                [r.seam.clone()],
                Props::new().opacity(0.0).with(Prop::ScaleX, 0.0),
            )
            .duration(cfg.seam_fade_secs)
            .ease(cfg.seam_fade_ease)
            .at(StepPosition::WithPrevious(0.0)),
        )
}

fn reduced_descriptor(cfg: &BootConfig, r: &BootRegions) -> TimelineDescriptor {
    TimelineDescriptor::new()
        .step(counter_step(cfg, r))
        .cue(UNLOCK_CUE, StepPosition::AfterPrevious(0.0))
        .step(
            TweenStep::to([r.overlay.clone()], Props::new().opacity(0.0))
                .duration(cfg.reduced_fade_secs)
                .at(StepPosition::AfterPrevious(0.0)),
        )
}

fn counter_step(cfg: &BootConfig, r: &BootRegions) -> TweenStep {
    TweenStep::to([r.counter.clone()], Props::new().with(Prop::Counter, 100.0))
        .from(Props::new().with(Prop::Counter, 0.0))
        .duration(cfg.counter_secs)
        .ease(cfg.counter_ease)
        .at(StepPosition::At(0.0))
}

#[cfg(test)]
#[path = "../../tests/unit/boot/sequencer.rs"]
mod tests;
