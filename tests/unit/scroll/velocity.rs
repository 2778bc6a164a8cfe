use super::*;

#[test]
fn rejects_out_of_range_smoothing() {
    assert!(VelocityTracker::new(0.0, 100.0).is_err());
    assert!(VelocityTracker::new(1.5, 100.0).is_err());
    assert!(VelocityTracker::new(0.5, 0.0).is_err());
    assert!(VelocityTracker::new(1.0, 100.0).is_ok());
}

#[test]
fn full_smoothing_reports_instant_velocity() {
    let mut v = VelocityTracker::new(1.0, 100.0).unwrap();
    assert_eq!(v.observe(32.0, 16.0), 2.0);
    assert_eq!(v.observe(-16.0, 16.0), -1.0);
}

#[test]
fn partial_smoothing_converges() {
    let mut v = VelocityTracker::new(0.5, 100.0).unwrap();
    assert_eq!(v.observe(20.0, 10.0), 1.0);
    assert_eq!(v.observe(20.0, 10.0), 1.5);
    assert_eq!(v.observe(20.0, 10.0), 1.75);
}

#[test]
fn long_frame_interval_is_capped() {
    let mut v = VelocityTracker::new(1.0, 100.0).unwrap();
    // A 5 s background gap counts as 100 ms.
    assert_eq!(v.observe(500.0, 5000.0), 5.0);
}

#[test]
fn zero_dt_leaves_velocity_unchanged() {
    let mut v = VelocityTracker::new(1.0, 100.0).unwrap();
    v.observe(10.0, 10.0);
    assert_eq!(v.observe(999.0, 0.0), 1.0);
    v.reset();
    assert_eq!(v.velocity(), 0.0);
}
