use super::*;

#[test]
fn lag_alpha_edges() {
    assert_eq!(lag_alpha(16.0, 0.0), 1.0);
    assert_eq!(lag_alpha(0.0, 1.0), 0.0);
    let a = lag_alpha(16.0, 1.0);
    assert!(a > 0.0 && a < 0.05);
}

#[test]
fn wrap_moves_in_whole_steps() {
    assert_eq!(wrap_by_step(-50.5, -50.0, 0.0, 25.0), -25.5);
    assert_eq!(wrap_by_step(0.25, -50.0, 0.0, 25.0), -24.75);
    assert_eq!(wrap_by_step(-30.0, -50.0, 0.0, 25.0), -30.0);
}

#[test]
fn lerp_and_clamp() {
    assert_eq!(lerp(10.0, 20.0, 0.25), 12.5);
    assert_eq!(clamp01(-1.0), 0.0);
    assert_eq!(clamp01(2.0), 1.0);
}

#[test]
fn wrap_handles_far_and_non_finite_values() {
    assert_eq!(wrap_by_step(-1000.0, -50.0, 0.0, 25.0), -25.0);
    assert_eq!(wrap_by_step(1e6 + 0.5, -50.0, 0.0, 25.0), -24.5);
    assert_eq!(wrap_by_step(f64::INFINITY, -50.0, 0.0, 25.0), -50.0);
}
