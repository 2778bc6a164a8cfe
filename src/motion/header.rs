//! Header that hides while scrolling down and returns when scrolling up.

use crate::animation::props::{Prop, Props};
use crate::animation::timeline::{Timeline, TimelineDescriptor, TweenStep, build_timeline};
use crate::config::HeaderConfig;
use crate::foundation::core::{PlayDirection, ScrollDirection};
use crate::foundation::error::CineResult;
use crate::foundation::ids::RegionId;
use crate::stage::Stage;
use crate::trigger::binding::{BindingCtx, BindingTarget};

/// Observe-mode binding target over the whole page.
#[derive(Debug)]
pub(crate) struct HeaderTarget {
    timeline: Timeline,
    show_above_px: f64,
}

impl HeaderTarget {
    /// The header starts shown: the show animation sits at its end.
    pub(crate) fn new(region: RegionId, cfg: &HeaderConfig) -> CineResult<Self> {
        let descriptor = TimelineDescriptor::new().step(
            TweenStep::to([region], Props::new().with(Prop::YPercent, 0.0))
                .from(Props::new().with(Prop::YPercent, cfg.hidden_y_percent))
                .duration(cfg.duration_secs)
                .ease(cfg.ease),
        );
        let mut timeline = build_timeline(&descriptor)?;
        let mut scratch = Stage::new();
        timeline.seek(1.0, &mut scratch);
        Ok(Self {
            timeline,
            show_above_px: cfg.show_above_px,
        })
    }

    pub(crate) fn is_shown_or_showing(&self) -> bool {
        self.timeline.playing() == Some(PlayDirection::Forward)
            || (self.timeline.playing().is_none() && self.timeline.progress() >= 1.0)
    }
}

impl BindingTarget for HeaderTarget {
    fn prime(&mut self, stage: &mut Stage) {
        self.timeline.render(stage);
    }

    fn on_update(&mut self, ctx: &mut BindingCtx<'_>) {
        let near_top = ctx.frame.virtual_position_px < self.show_above_px;
        let wanted = match ctx.direction {
            ScrollDirection::Backward => Some(PlayDirection::Forward),
            _ if near_top => Some(PlayDirection::Forward),
            ScrollDirection::Forward => Some(PlayDirection::Reverse),
            ScrollDirection::Still => None,
        };
        let Some(direction) = wanted else {
            return;
        };
        let settled = match direction {
            PlayDirection::Forward => self.is_shown_or_showing(),
            PlayDirection::Reverse => self.timeline.playing() == Some(direction),
        };
        if !settled {
            self.timeline.play(direction);
        }
    }

    fn advance(&mut self, dt_ms: f64, stage: &mut Stage) {
        self.timeline.advance(dt_ms, stage);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/header.rs"]
mod tests;
