use crate::foundation::error::{CineError, CineResult};

/// Exponentially smoothed scroll velocity.
#[derive(Clone, Debug)]
pub struct VelocityTracker {
    smoothing: f64,
    max_dt_ms: f64,
    smoothed: f64,
}

impl VelocityTracker {
    /// `smoothing` must lie in `(0, 1]`; `max_dt_ms` caps the frame interval
    /// seen after the tab was backgrounded.
    pub fn new(smoothing: f64, max_dt_ms: f64) -> CineResult<Self> {
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(CineError::validation(format!(
                "velocity smoothing must be in (0, 1] (got {smoothing})"
            )));
        }
        if !(max_dt_ms.is_finite() && max_dt_ms > 0.0) {
            return Err(CineError::validation("velocity max_dt_ms must be > 0"));
        }
        Ok(Self {
            smoothing,
            max_dt_ms,
            smoothed: 0.0,
        })
    }

    /// Fold one frame's delta into the smoothed velocity and return it (px/ms).
    pub fn observe(&mut self, raw_delta_px: f64, dt_ms: f64) -> f64 {
        if !(dt_ms > 0.0) || !raw_delta_px.is_finite() {
            return self.smoothed;
        }
        let dt = dt_ms.min(self.max_dt_ms);
        let instant = raw_delta_px / dt;
        self.smoothed += (instant - self.smoothed) * self.smoothing;
        // Sub-micro velocities are noise from the lerp tail.
        if self.smoothed.abs() < 1e-6 {
            self.smoothed = 0.0;
        }
        self.smoothed
    }

    /// Last smoothed value.
    pub fn velocity(&self) -> f64 {
        self.smoothed
    }

    /// Forget accumulated motion.
    pub fn reset(&mut self) {
        self.smoothed = 0.0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/velocity.rs"]
mod tests;
