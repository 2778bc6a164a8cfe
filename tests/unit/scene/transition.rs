use super::*;
use crate::foundation::core::{Rect, ScrollRange, Size};
use crate::host::StaticLayout;
use crate::scroll::frame::ScrollFrame;
use crate::stage::Stage;
use crate::trigger::registry::TriggerRegistry;

fn layout() -> StaticLayout {
    StaticLayout::new(Size::new(1440.0, 900.0), 6000.0)
        .with_region("work", Rect::new(0.0, 900.0, 1440.0, 1800.0))
}

fn frame(pos: f64, velocity: f64) -> ScrollFrame {
    ScrollFrame {
        timestamp_ms: 0.0,
        raw_delta_px: 0.0,
        virtual_position_px: pos,
        velocity_px_per_ms: velocity,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn register(spec: &SceneSpec, reduced: bool) -> (TriggerRegistry, SceneHandles) {
    let layout = layout();
    let mut registry = TriggerRegistry::new();
    let (exit, reveal) = scene_bindings(spec, &RevealConfig::default(), reduced).unwrap();
    let mut handles = SceneHandles::default();
    if let Some(b) = exit {
        handles.transition = registry.register(b, &layout).unwrap();
    }
    if let Some(b) = reveal {
        handles.reveal = registry.register(b, &layout).unwrap();
    }
    (registry, handles)
}

#[test]
fn soft_cut_scrubs_over_section_exit() {
    let spec = SceneSpec::new("work").transition(SceneTransition::SoftCut);
    let (mut registry, handles) = register(&spec, false);
    let h = handles.transition.unwrap();
    assert_eq!(registry.range(h).unwrap(), ScrollRange::new(900.0, 1800.0).unwrap());

    let mut stage = Stage::new();
    let work = RegionId::from("work");
    registry.update(&frame(1000.0, 1.0), &mut stage);
    assert!(stage.get(&work, Prop::Opacity) > 0.9);

    registry.update(&frame(2000.0, 1.0), &mut stage);
    assert!(approx(stage.get(&work, Prop::Opacity), 0.0));
    assert!(approx(stage.get(&work, Prop::Scale), 1.1));
    assert!(approx(stage.get(&work, Prop::Y), -100.0));
    assert!(approx(stage.get(&work, Prop::Blur), 15.0));

    registry.update(&frame(500.0, -1.0), &mut stage);
    assert!(approx(stage.get(&work, Prop::Opacity), 1.0));
    assert!(approx(stage.get(&work, Prop::Blur), 0.0));
}

#[test]
fn editorial_wipe_clips_from_bottom() {
    let d = SceneTransition::EditorialWipe.descriptor(&RegionId::from("s"));
    let tl = build_timeline(&d).unwrap();
    let end = tl.snapshot(1.0);
    let s = RegionId::from("s");
    assert!(approx(end[&(s.clone(), Prop::ClipBottom)], 100.0));
    assert!(approx(end[&(s.clone(), Prop::Scale)], 0.9));
    assert!(approx(end[&(s, Prop::Opacity)], 0.0));
}

#[test]
fn parallax_layers_travel_by_speed() {
    let t = SceneTransition::ParallaxDepth {
        layers: vec![
            ParallaxLayer {
                region: "back".into(),
                speed: 0.5,
            },
            ParallaxLayer {
                region: "front".into(),
                speed: 1.0,
            },
        ],
    };
    let tl = build_timeline(&t.descriptor(&RegionId::from("s"))).unwrap();
    let half = tl.snapshot(0.5);
    let end = tl.snapshot(1.0);
    assert!(approx(end[&(RegionId::from("back"), Prop::Y)], -100.0));
    assert!(approx(end[&(RegionId::from("front"), Prop::Y)], -200.0));
    assert!((half[&(RegionId::from("front"), Prop::Y)] + 100.0).abs() < 1e-9);
    assert!(approx(end[&(RegionId::from("s"), Prop::Blur)], 10.0));
}

#[test]
fn parallax_speed_defaults_when_omitted() {
    let t: SceneTransition =
        serde_json::from_str(r#"{"kind":"parallax_depth","layers":[{"region":"a"}]}"#).unwrap();
    let SceneTransition::ParallaxDepth { layers } = t else {
        panic!("wrong variant");
    };
    assert_eq!(layers[0].speed, 0.2);
}

#[test]
fn reveal_plays_on_entry_and_reverses_on_exit_backward() {
    let spec = SceneSpec::new("work").reveal("title").reveal("copy");
    let (mut registry, handles) = register(&spec, false);
    assert!(handles.transition.is_none());
    let h = handles.reveal.unwrap();
    // top of section meets 80% of the viewport
    assert_eq!(registry.range(h).unwrap(), ScrollRange::new(180.0, 1800.0).unwrap());

    let mut stage = Stage::new();
    let title = RegionId::from("title");
    let copy = RegionId::from("copy");
    registry.update(&frame(0.0, 0.0), &mut stage);
    assert_eq!(stage.get(&title, Prop::Opacity), 0.0);
    assert_eq!(stage.get(&title, Prop::Y), 30.0);

    registry.update(&frame(400.0, 2.0), &mut stage);
    registry.advance(100.0, &mut stage);
    assert!(stage.get(&title, Prop::Opacity) > stage.get(&copy, Prop::Opacity));
    registry.advance(2000.0, &mut stage);
    assert!(approx(stage.get(&title, Prop::Opacity), 1.0));
    assert!(approx(stage.get(&copy, Prop::Blur), 0.0));

    // leaving downward keeps the reveal
    registry.update(&frame(2000.0, 2.0), &mut stage);
    registry.advance(2000.0, &mut stage);
    assert!(approx(stage.get(&copy, Prop::Opacity), 1.0));

    registry.update(&frame(1000.0, -2.0), &mut stage);
    registry.update(&frame(100.0, -2.0), &mut stage);
    registry.advance(2000.0, &mut stage);
    assert!(approx(stage.get(&copy, Prop::Opacity), 0.0));
}

#[test]
fn reduced_motion_keeps_reveals_only() {
    let spec = SceneSpec::new("work")
        .transition(SceneTransition::SoftCut)
        .reveal("title");
    let (registry, handles) = register(&spec, true);
    assert!(handles.transition.is_none());
    assert!(handles.reveal.is_some());
    assert_eq!(registry.len(), 1);
}

#[test]
fn scene_spec_from_json() {
    let spec: SceneSpec = serde_json::from_str(
        r#"{"section":"work","transition":{"kind":"editorial_wipe"},"reveals":["a","b"]}"#,
    )
    .unwrap();
    assert_eq!(spec.transition, Some(SceneTransition::EditorialWipe));
    assert_eq!(spec.reveals.len(), 2);
    assert_eq!(spec.scrub, ScrubSmoothing::Immediate);
}
