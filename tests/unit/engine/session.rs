use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::animation::props::{Prop, Props};
use crate::animation::timeline::TweenStep;
use crate::foundation::core::{Rect, Size};
use crate::foundation::error::CineError;
use crate::host::StaticLayout;
use crate::motion::drift::DriftRow;
use crate::pin::controller::SceneDef;
use crate::pin::segment::SceneWidth;

const STEP_MS: f64 = 16.0;

fn layout() -> StaticLayout {
    StaticLayout::new(Size::new(1440.0, 900.0), 8000.0)
        .with_region("hero", Rect::new(0.0, 0.0, 1440.0, 900.0))
        .with_region("gallery", Rect::new(0.0, 1000.0, 1440.0, 1900.0))
}

fn engine(reduced_motion: bool) -> Engine<StaticLayout> {
    Engine::new(EngineConfig::default(), layout(), HostEnv { reduced_motion }).unwrap()
}

/// Tick every `STEP_MS` in `(from_ms, to_ms]`, collecting events.
fn run(engine: &mut Engine<StaticLayout>, from_ms: f64, to_ms: f64) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    let mut i = 1;
    loop {
        let now = from_ms + i as f64 * STEP_MS;
        if now > to_ms {
            break;
        }
        events.extend(engine.tick(now).events);
        i += 1;
    }
    events
}

fn gallery_pin() -> PinDef {
    PinDef::new("gallery")
        .scene(SceneDef::new(SceneWidth::Viewport))
        .scene(SceneDef::new(SceneWidth::Viewport))
        .scene(SceneDef::new(SceneWidth::Viewport))
}

#[test]
fn lifecycle_events_arrive_in_order() {
    let mut e = engine(false);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    e.on_event(move |ev| sink.borrow_mut().push(ev));

    e.init(0.0);
    assert_eq!(e.boot_state(), BootState::Counting);
    let events = run(&mut e, 0.0, 2700.0);
    assert!(events.is_empty());
    let events = run(&mut e, 2700.0, 5000.0);
    assert_eq!(
        events,
        vec![
            EngineEvent::InteractionUnlocked,
            EngineEvent::Ready,
            EngineEvent::Refreshed
        ]
    );
    assert_eq!(*seen.borrow(), events);
    assert_eq!(e.boot_state(), BootState::Done);
}

#[test]
fn input_before_unlock_is_dropped() {
    let mut e = engine(false);
    e.init(0.0);
    e.tick(16.0);
    e.push_input(InputEvent::Wheel { delta_px: 400.0 });
    run(&mut e, 16.0, 3000.0);
    assert_eq!(e.position(), 0.0);

    e.push_input(InputEvent::Wheel { delta_px: 300.0 });
    run(&mut e, 3000.0, 6000.0);
    assert_eq!(e.position(), 300.0);
}

#[test]
fn nothing_happens_outside_running() {
    let mut e = engine(false);
    assert_eq!(e.tick(0.0), TickReport::default());
    e.init(0.0);
    e.init(50.0);
    assert_eq!(e.lifecycle(), EngineLifecycle::Running);

    e.dispose();
    e.dispose();
    assert_eq!(e.lifecycle(), EngineLifecycle::Disposed);
    assert_eq!(e.tick(100.0), TickReport::default());
    assert!(matches!(
        e.enable_header("nav").unwrap_err(),
        CineError::Validation(_)
    ));
    e.init(200.0);
    assert_eq!(e.lifecycle(), EngineLifecycle::Disposed);
}

#[test]
fn resize_burst_refreshes_once_after_quiet_period() {
    let mut e = engine(false);
    e.init(0.0);
    run(&mut e, 0.0, 5000.0);
    assert_eq!(e.scroller().content_extent(), 7100.0);

    e.layout_mut().document_height = 3000.0;
    e.notify_resize(5000.0);
    e.notify_resize(5100.0);
    assert!(e.tick(5250.0).events.is_empty());
    assert_eq!(e.tick(5300.0).events.as_slice(), &[EngineEvent::Refreshed]);
    assert!(e.tick(5600.0).events.is_empty());
    assert_eq!(e.scroller().content_extent(), 2100.0);
}

#[test]
fn pin_snaps_to_nearest_scene_after_scrolling_stops() {
    let mut e = engine(false);
    let id = e.attach_pin(gallery_pin()).unwrap();
    e.init(0.0);
    run(&mut e, 0.0, 3000.0);

    // 1000 + 0.4 · (2880 + 900): nearest scene is the middle one.
    e.push_input(InputEvent::Wheel { delta_px: 2512.0 });
    run(&mut e, 3000.0, 9000.0);
    assert!((e.position() - 2890.0).abs() < 1e-6);
    assert!((e.pin(id).unwrap().horizontal_progress() - 0.5).abs() < 1e-9);
    assert!(e.scroller().is_settled());
    assert!((e.stage().get(&RegionId::from("gallery"), Prop::X) + 1440.0).abs() < 1e-6);
}

#[test]
fn snapping_can_be_disabled() {
    let mut cfg = EngineConfig::default();
    cfg.pin.snap_enabled = false;
    let mut e = Engine::new(cfg, layout(), HostEnv::default()).unwrap();
    e.attach_pin(gallery_pin()).unwrap();
    e.init(0.0);
    run(&mut e, 0.0, 3000.0);
    e.push_input(InputEvent::Wheel { delta_px: 2512.0 });
    run(&mut e, 3000.0, 9000.0);
    assert_eq!(e.position(), 2512.0);
}

#[test]
fn second_pin_on_same_container_conflicts() {
    let mut e = engine(false);
    let first = e.attach_pin(gallery_pin()).unwrap();
    assert!(matches!(
        e.attach_pin(gallery_pin()).unwrap_err(),
        CineError::Conflict(_)
    ));
    assert!(e.detach_pin(first));
    assert!(!e.detach_pin(first));
    e.attach_pin(gallery_pin()).unwrap();
}

#[test]
fn reduced_motion_follows_native_scroll() {
    let mut e = engine(true);
    assert_eq!(
        e.set_drift(&DriftDef {
            watch: "hero".into(),
            rows: vec![DriftRow {
                region: "row".into(),
                factor: -1.0,
            }],
        })
        .unwrap(),
        None
    );
    e.init(0.0);
    let events = run(&mut e, 0.0, 3000.0);
    assert_eq!(
        events,
        vec![
            EngineEvent::InteractionUnlocked,
            EngineEvent::Ready,
            EngineEvent::Refreshed
        ]
    );
    e.push_input(InputEvent::Native { position_px: 1234.0 });
    let frame = e.tick(3016.0).frame.unwrap();
    assert_eq!(frame.virtual_position_px, 1234.0);
    assert_eq!(frame.velocity_px_per_ms, 0.0);
}

#[test]
fn drift_moves_rows_every_tick() {
    let mut e = engine(false);
    let handle = e
        .set_drift(&DriftDef {
            watch: "hero".into(),
            rows: vec![DriftRow {
                region: "row".into(),
                factor: -1.0,
            }],
        })
        .unwrap();
    assert!(handle.is_some());
    e.init(0.0);
    run(&mut e, 0.0, 500.0);
    let x = e.stage().get(&RegionId::from("row"), Prop::XPercent);
    assert!(x < -25.0 && x > -50.0);
}

#[test]
fn entrance_waits_for_unlock_plus_delay() {
    let mut e = engine(false);
    let title = RegionId::from("hero-title");
    let descriptor = TimelineDescriptor::new().step(
        TweenStep::to([title.clone()], Props::new().y(0.0))
            .from(Props::new().y(50.0))
            .duration(1.0),
    );
    e.register_entrance(&descriptor, 500.0).unwrap();
    assert!(e.register_entrance(&descriptor, -1.0).is_err());
    assert_eq!(e.stage().get(&title, Prop::Y), 50.0);

    e.init(0.0);
    run(&mut e, 0.0, 3200.0);
    assert_eq!(e.stage().get(&title, Prop::Y), 50.0);
    run(&mut e, 3200.0, 5000.0);
    assert_eq!(e.stage().get(&title, Prop::Y), 0.0);
}

#[test]
fn header_hides_when_scrolling_down() {
    let mut e = engine(false);
    e.enable_header("nav").unwrap();
    e.init(0.0);
    run(&mut e, 0.0, 3000.0);
    let nav = RegionId::from("nav");
    assert_eq!(e.stage().get(&nav, Prop::YPercent), 0.0);

    e.push_input(InputEvent::Wheel { delta_px: 1200.0 });
    run(&mut e, 3000.0, 6000.0);
    assert_eq!(e.stage().get(&nav, Prop::YPercent), -100.0);
}
