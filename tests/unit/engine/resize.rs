use super::*;

#[test]
fn burst_collapses_into_one_recompute() {
    let mut d = ResizeDebouncer::new(200.0);
    d.notify(0.0);
    d.notify(50.0);
    d.notify(120.0);
    assert_eq!(d.poll(250.0), None);
    assert!(d.is_pending());
    assert_eq!(d.poll(320.0), Some(3));
    assert!(!d.is_pending());
    assert_eq!(d.poll(1000.0), None);
}

#[test]
fn zero_wait_fires_on_next_poll() {
    let mut d = ResizeDebouncer::new(0.0);
    d.notify(10.0);
    assert_eq!(d.poll(10.0), Some(1));
}

#[test]
fn negative_wait_is_treated_as_zero() {
    let mut d = ResizeDebouncer::new(-5.0);
    d.notify(10.0);
    assert_eq!(d.poll(10.0), Some(1));
}

#[test]
fn cancel_drops_pending_work() {
    let mut d = ResizeDebouncer::new(100.0);
    d.notify(0.0);
    d.cancel();
    assert_eq!(d.poll(500.0), None);
    d.notify(600.0);
    assert_eq!(d.poll(700.0), Some(1));
}
