use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::{Rect, Size};
use crate::host::StaticLayout;
use crate::trigger::binding::CallbackTarget;
use crate::trigger::range::ScrollAnchor;

#[derive(Clone, Debug, PartialEq)]
enum Ev {
    Enter,
    Leave,
    Progress(f64),
    Toggle(PlayDirection),
    Update(f64),
}

type Log = Rc<RefCell<Vec<Ev>>>;

fn recorder(log: &Log) -> CallbackTarget {
    let (a, b, c, d, e) = (
        Rc::clone(log),
        Rc::clone(log),
        Rc::clone(log),
        Rc::clone(log),
        Rc::clone(log),
    );
    CallbackTarget::new()
        .when_enter(move |_| a.borrow_mut().push(Ev::Enter))
        .when_leave(move |_| b.borrow_mut().push(Ev::Leave))
        .when_progress(move |p| c.borrow_mut().push(Ev::Progress(p)))
        .when_toggle(move |d2| d.borrow_mut().push(Ev::Toggle(d2)))
        .when_update(move |f| e.borrow_mut().push(Ev::Update(f.virtual_position_px)))
}

fn layout() -> StaticLayout {
    StaticLayout::new(Size::new(1440.0, 900.0), 8000.0)
        .with_region("about", Rect::new(0.0, 1800.0, 1440.0, 2700.0))
}

fn frame(pos: f64, velocity: f64) -> ScrollFrame {
    ScrollFrame {
        timestamp_ms: 0.0,
        raw_delta_px: 0.0,
        virtual_position_px: pos,
        velocity_px_per_ms: velocity,
    }
}

fn scrub(log: &Log, key: &str) -> TriggerBinding {
    TriggerBinding::new(
        key,
        RangeSpec::absolute(1000.0, 2000.0).unwrap(),
        BindingMode::Scrub(ScrubSmoothing::Immediate),
        recorder(log),
    )
}

#[test]
fn range_scenario_enter_progress_leave() {
    let log: Log = Rc::default();
    let mut reg = TriggerRegistry::new();
    let mut stage = Stage::new();
    reg.register(scrub(&log, "s"), &layout()).unwrap().unwrap();

    reg.update(&frame(900.0, 1.0), &mut stage);
    assert!(log.borrow().is_empty());

    reg.update(&frame(1000.0, 1.0), &mut stage);
    assert_eq!(*log.borrow(), vec![Ev::Enter, Ev::Progress(0.0)]);
    log.borrow_mut().clear();

    reg.update(&frame(1500.0, 1.0), &mut stage);
    assert_eq!(*log.borrow(), vec![Ev::Progress(0.5)]);
    log.borrow_mut().clear();

    reg.update(&frame(2000.0, 1.0), &mut stage);
    assert_eq!(*log.borrow(), vec![Ev::Progress(1.0), Ev::Leave]);
    log.borrow_mut().clear();

    reg.update(&frame(2500.0, 1.0), &mut stage);
    assert!(log.borrow().is_empty());

    // Back inside, then below the start.
    reg.update(&frame(1500.0, -1.0), &mut stage);
    reg.update(&frame(999.0, -1.0), &mut stage);
    assert_eq!(
        *log.borrow(),
        vec![Ev::Enter, Ev::Progress(0.5), Ev::Progress(0.0), Ev::Leave]
    );
}

#[test]
fn skipping_over_a_range_fires_enter_boundary_leave() {
    let log: Log = Rc::default();
    let mut reg = TriggerRegistry::new();
    let mut stage = Stage::new();
    reg.register(scrub(&log, "s"), &layout()).unwrap();
    reg.update(&frame(0.0, 0.0), &mut stage);
    reg.update(&frame(5000.0, 3.0), &mut stage);
    assert_eq!(*log.borrow(), vec![Ev::Enter, Ev::Progress(1.0), Ev::Leave]);
    log.borrow_mut().clear();
    reg.update(&frame(0.0, -3.0), &mut stage);
    assert_eq!(*log.borrow(), vec![Ev::Enter, Ev::Progress(0.0), Ev::Leave]);
}

#[test]
fn duplicate_keys_fail_fast() {
    let log: Log = Rc::default();
    let mut reg = TriggerRegistry::new();
    reg.register(scrub(&log, "hero"), &layout()).unwrap();
    let err = reg.register(scrub(&log, "hero"), &layout()).unwrap_err();
    assert!(matches!(err, CineError::DuplicateBinding(ref k) if k == "hero"));
    assert_eq!(reg.len(), 1);
}

#[test]
fn missing_region_is_an_inert_registration() {
    let log: Log = Rc::default();
    let mut reg = TriggerRegistry::new();
    let binding = TriggerBinding::new(
        "ghost",
        RangeSpec::between("ghost", ScrollAnchor::TOP_TOP, ScrollAnchor::BOTTOM_TOP),
        BindingMode::Toggle,
        recorder(&log),
    );
    assert_eq!(reg.register(binding, &layout()).unwrap(), None);
    assert!(reg.is_empty());
    // The key was never taken.
    assert!(reg.register(scrub(&log, "ghost"), &layout()).unwrap().is_some());
}

#[test]
fn toggle_direction_comes_from_velocity_sign() {
    let log: Log = Rc::default();
    let mut reg = TriggerRegistry::new();
    let mut stage = Stage::new();
    let binding = TriggerBinding::new(
        "reveal",
        RangeSpec::absolute(1000.0, 2000.0).unwrap(),
        BindingMode::Toggle,
        recorder(&log),
    );
    reg.register(binding, &layout()).unwrap();

    reg.update(&frame(1200.0, 2.0), &mut stage);
    reg.update(&frame(2200.0, 2.0), &mut stage);
    reg.update(&frame(1200.0, -2.0), &mut stage);
    reg.update(&frame(800.0, -2.0), &mut stage);
    assert_eq!(
        *log.borrow(),
        vec![
            Ev::Enter,
            Ev::Toggle(PlayDirection::Forward),
            Ev::Leave,
            Ev::Enter,
            Ev::Leave,
            Ev::Toggle(PlayDirection::Reverse),
        ]
    );
}

#[test]
fn toggle_with_zero_velocity_uses_side_of_range() {
    let log: Log = Rc::default();
    let mut reg = TriggerRegistry::new();
    let mut stage = Stage::new();
    let binding = TriggerBinding::new(
        "reveal",
        RangeSpec::absolute(1000.0, 2000.0).unwrap(),
        BindingMode::Toggle,
        recorder(&log),
    );
    reg.register(binding, &layout()).unwrap();
    reg.update(&frame(1500.0, 0.0), &mut stage);
    reg.update(&frame(10.0, 0.0), &mut stage);
    assert_eq!(
        *log.borrow(),
        vec![
            Ev::Enter,
            Ev::Toggle(PlayDirection::Forward),
            Ev::Leave,
            Ev::Toggle(PlayDirection::Reverse),
        ]
    );
}

#[test]
fn overlapping_bindings_run_in_registration_order() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut reg = TriggerRegistry::new();
    let mut stage = Stage::new();
    for key in ["first", "second", "third"] {
        let o = Rc::clone(&order);
        let target = CallbackTarget::new().when_progress(move |_| o.borrow_mut().push(key));
        let b = TriggerBinding::new(
            key,
            RangeSpec::absolute(0.0, 3000.0).unwrap(),
            BindingMode::Scrub(ScrubSmoothing::Immediate),
            target,
        );
        reg.register(b, &layout()).unwrap();
    }
    reg.update(&frame(100.0, 0.0), &mut stage);
    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn unregistered_binding_receives_nothing() {
    let log: Log = Rc::default();
    let mut reg = TriggerRegistry::new();
    let mut stage = Stage::new();
    let h = reg.register(scrub(&log, "s"), &layout()).unwrap().unwrap();
    assert!(reg.unregister(h));
    assert!(!reg.unregister(h));
    reg.update(&frame(1500.0, 1.0), &mut stage);
    reg.advance(16.0, &mut stage);
    assert!(log.borrow().is_empty());
}

#[test]
fn observe_mode_sees_every_frame_inside() {
    let log: Log = Rc::default();
    let mut reg = TriggerRegistry::new();
    let mut stage = Stage::new();
    let b = TriggerBinding::new(
        "watch",
        RangeSpec::absolute(0.0, 1000.0).unwrap(),
        BindingMode::Observe,
        recorder(&log),
    );
    reg.register(b, &layout()).unwrap();
    reg.update(&frame(0.0, 0.0), &mut stage);
    reg.update(&frame(10.0, 0.5), &mut stage);
    reg.update(&frame(1500.0, 0.5), &mut stage);
    assert_eq!(
        *log.borrow(),
        vec![Ev::Enter, Ev::Update(0.0), Ev::Update(10.0), Ev::Leave]
    );
}

#[test]
fn lagged_scrub_eases_toward_goal() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let mut reg = TriggerRegistry::new();
    let mut stage = Stage::new();
    let b = TriggerBinding::new(
        "contact",
        RangeSpec::absolute(1000.0, 2000.0).unwrap(),
        BindingMode::Scrub(ScrubSmoothing::Lagged { secs: 2.0 }),
        CallbackTarget::new().when_progress(move |p| s.borrow_mut().push(p)),
    );
    let h = reg.register(b, &layout()).unwrap().unwrap();
    reg.update(&frame(2000.0, 1.0), &mut stage);
    assert!(seen.borrow().is_empty());

    reg.advance(100.0, &mut stage);
    let first = seen.borrow()[0];
    assert!(first > 0.0 && first < 0.1, "{first}");

    for _ in 0..2000 {
        reg.advance(16.0, &mut stage);
    }
    assert_eq!(reg.progress(h), Some(1.0));
    let last = *seen.borrow().last().unwrap();
    assert_eq!(last, 1.0);
    let calls = seen.borrow().len();
    reg.advance(16.0, &mut stage);
    assert_eq!(seen.borrow().len(), calls, "settled scrub stays quiet");
}

#[test]
fn refresh_reresolves_anchored_ranges() {
    let log: Log = Rc::default();
    let mut l = layout();
    let mut reg = TriggerRegistry::new();
    let b = TriggerBinding::new(
        "about",
        RangeSpec::between("about", ScrollAnchor::TOP_TOP, ScrollAnchor::BOTTOM_TOP),
        BindingMode::Scrub(ScrubSmoothing::Immediate),
        recorder(&log),
    );
    let h = reg.register(b, &l).unwrap().unwrap();
    assert_eq!(reg.range(h), Some(ScrollRange { start: 1800.0, end: 2700.0 }));

    l.set_region("about", Rect::new(0.0, 2000.0, 1440.0, 3200.0));
    reg.refresh(&l);
    assert_eq!(reg.range(h), Some(ScrollRange { start: 2000.0, end: 3200.0 }));

    l.remove_region(&"about".into());
    reg.refresh(&l);
    assert_eq!(reg.range(h), Some(ScrollRange { start: 2000.0, end: 3200.0 }));

    assert!(reg.set_range(h, RangeSpec::absolute(10.0, 20.0).unwrap(), &l));
    assert_eq!(reg.range(h), Some(ScrollRange { start: 10.0, end: 20.0 }));
}
