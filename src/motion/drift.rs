//! Continuously drifting ribbons whose speed reacts to scroll velocity.

use crate::animation::props::Prop;
use crate::config::DriftConfig;
use crate::foundation::ids::RegionId;
use crate::foundation::math::wrap_by_step;
use crate::stage::Stage;
use crate::trigger::binding::{BindingCtx, BindingTarget};

/// One drifting row.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DriftRow {
    /// Region translated along `XPercent`.
    pub region: RegionId,
    /// Signed multiplier on the shared speed (`-1.0` drifts left).
    pub factor: f64,
}

/// Rows plus the region whose range boosts their speed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DriftDef {
    /// Region whose "top top" to "bottom top" range reacts to velocity.
    pub watch: RegionId,
    /// Rows to move.
    pub rows: Vec<DriftRow>,
}

/// Drift state: one shared speed, one position per row.
#[derive(Clone, Debug)]
pub struct Drift {
    cfg: DriftConfig,
    rows: Vec<(DriftRow, f64)>,
    current: f64,
    target: f64,
}

impl Drift {
    /// Rows start at the configured offset, at base speed.
    pub fn new(def: &DriftDef, cfg: DriftConfig) -> Self {
        let start = cfg.initial_x_percent;
        Self {
            rows: def.rows.iter().map(|r| (r.clone(), start)).collect(),
            current: cfg.base_speed,
            target: cfg.base_speed,
            cfg,
        }
    }

    /// Speed currently applied.
    pub fn speed(&self) -> f64 {
        self.current
    }

    /// Speed being eased toward.
    pub fn target_speed(&self) -> f64 {
        self.target
    }

    /// Row positions in percent, in definition order.
    pub fn positions(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|(_, pos)| *pos)
    }

    /// Retarget the speed from a scroll velocity in px/ms.
    pub fn observe(&mut self, velocity_px_per_ms: f64) {
        let per_sec = velocity_px_per_ms.abs() * 1000.0;
        let boost = (per_sec / self.cfg.velocity_divisor_px_per_s).min(self.cfg.max_boost);
        self.target = self.cfg.base_speed + if boost.is_finite() { boost } else { 0.0 };
    }

    /// Move every row by one tick and write its position.
    pub fn step(&mut self, dt_ms: f64, stage: &mut Stage) {
        self.current += (self.target - self.current) * self.cfg.speed_lerp;
        let delta = dt_ms.max(0.0) * self.cfg.frame_scale;
        let travel = self.current * delta;
        let (lo, hi, step) = (self.cfg.wrap_min, self.cfg.wrap_max, self.cfg.wrap_step);
        for (row, pos) in &mut self.rows {
            *pos = wrap_by_step(*pos + row.factor * travel, lo, hi, step);
            stage.set(&row.region, Prop::XPercent, *pos);
        }
    }

    fn write(&self, stage: &mut Stage) {
        for (row, pos) in &self.rows {
            stage.set(&row.region, Prop::XPercent, *pos);
        }
    }
}

/// Observe-mode binding target: velocity inside the watch range retargets the
/// speed, every tick moves the rows.
pub(crate) struct DriftTarget {
    pub(crate) drift: Drift,
}

impl BindingTarget for DriftTarget {
    fn prime(&mut self, stage: &mut Stage) {
        self.drift.write(stage);
    }

    fn on_update(&mut self, ctx: &mut BindingCtx<'_>) {
        self.drift.observe(ctx.frame.velocity_px_per_ms);
    }

    fn advance(&mut self, dt_ms: f64, stage: &mut Stage) {
        self.drift.step(dt_ms, stage);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/drift.rs"]
mod tests;
