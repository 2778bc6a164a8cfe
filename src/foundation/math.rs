pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub(crate) fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Fraction of the remaining distance to cover this frame when chasing a
/// target with a time constant of `lag_secs`.
pub(crate) fn lag_alpha(dt_ms: f64, lag_secs: f64) -> f64 {
    if lag_secs <= 0.0 {
        return 1.0;
    }
    if dt_ms <= 0.0 {
        return 0.0;
    }
    1.0 - (-dt_ms / (lag_secs * 1000.0)).exp()
}

/// Wrap `v` into `[lo, hi]` by stepping `step` at a time. Only ever moves by
/// whole steps so a marquee loops seamlessly over duplicated content.
/// Non-finite input restarts at `lo`.
pub(crate) fn wrap_by_step(v: f64, lo: f64, hi: f64, step: f64) -> f64 {
    if step <= 0.0 || lo >= hi {
        return v;
    }
    if !v.is_finite() {
        return lo;
    }
    if v <= lo {
        return v + (((lo - v) / step).floor() + 1.0) * step;
    }
    if v >= hi {
        return v - (((v - hi) / step).floor() + 1.0) * step;
    }
    v
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
