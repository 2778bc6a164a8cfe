use super::*;

const STUDIO: &str = include_str!("../../../demos/studio.page.json");
const TRACE: &str = include_str!("../../../demos/scroll.trace.json");

#[test]
fn demo_page_builds_every_registration() {
    let page = PageDef::from_json_str(STUDIO).unwrap();
    assert_eq!(page.scenes.len(), 3);
    assert_eq!(page.pins[0].scenes.len(), 3);
    assert_eq!(page.header, Some(RegionId::from("nav")));

    assert_eq!(page.bindings.len(), 3);

    let engine = page.build_engine().unwrap();
    // work: exit + reveal, process, contact, pin, three bindings, drift, header
    assert_eq!(engine.registry().len(), 10);
    assert!(engine.registry().contains_key(&BindingKey::from("contact-title")));
}

#[test]
fn reduced_motion_page_skips_transitions_and_drift() {
    let mut page = PageDef::from_json_str(STUDIO).unwrap();
    page.env.reduced_motion = true;
    let engine = page.build_engine().unwrap();
    // work reveal, pin, three bindings, header
    assert_eq!(engine.registry().len(), 6);
}

#[test]
fn unknown_page_fields_are_rejected() {
    let err = PageDef::from_json_str(
        r#"{ "layout": { "viewport": { "width": 1.0, "height": 1.0 }, "document_height": 1.0 }, "sceens": [] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, CineError::Serde(_)));
}

#[test]
fn minimal_page_defaults_everything_else() {
    let page = PageDef::from_json_str(
        r#"{ "layout": { "viewport": { "width": 800.0, "height": 600.0 }, "document_height": 2400.0 } }"#,
    )
    .unwrap();
    assert_eq!(page.config, EngineConfig::default());
    assert_eq!(page.boot_regions, BootRegions::default());
    assert!(!page.env.reduced_motion);
    assert_eq!(page.build_engine().unwrap().registry().len(), 0);
}

#[test]
fn pin_with_broken_detail_timeline_fails() {
    let spec = PinSpec {
        container: "gallery".into(),
        scenes: vec![PinSceneSpec {
            width: SceneWidth::Viewport,
            details: vec![DetailSpec {
                key: "empty".into(),
                window: SceneWindow::from_start(crate::trigger::range::ScrollAnchor::new(0.0, 0.6)),
                mode: BindingMode::Toggle,
                timeline: TimelineDescriptor::new(),
            }],
        }],
        progress_region: None,
        scrub: ScrubSmoothing::Immediate,
    };
    assert!(spec.to_def().is_err());
}

#[test]
fn pin_scrub_defaults_to_immediate_and_accepts_lag() {
    let spec: PinSpec = serde_json::from_str(r#"{ "container": "gallery", "scenes": [] }"#).unwrap();
    assert_eq!(spec.scrub, ScrubSmoothing::Immediate);
    let spec: PinSpec = serde_json::from_str(
        r#"{ "container": "gallery", "scenes": [], "scrub": { "lagged": { "secs": 1.0 } } }"#,
    )
    .unwrap();
    assert_eq!(spec.to_def().unwrap().scrub, ScrubSmoothing::Lagged { secs: 1.0 });
}

const SCRUB_PAGE: &str = r#"{
    "layout": {
        "viewport": { "width": 1000.0, "height": 800.0 },
        "document_height": 4000.0,
        "regions": {
            "about": { "x0": 0.0, "y0": 1000.0, "x1": 1000.0, "y1": 1800.0 },
            "about-line": { "x0": 0.0, "y0": 1200.0, "x1": 1000.0, "y1": 1202.0 }
        }
    },
    "bindings": [
        {
            "key": "about-line",
            "range": { "anchored": { "region": "about", "start": "top bottom", "end": { "anchor": "bottom top" } } },
            "mode": { "scrub": "immediate" },
            "timeline": {
                "entries": [
                    { "tween": { "targets": ["about-line"], "from": { "scale_x": 0.0 }, "to": { "scale_x": 1.0 } } }
                ]
            }
        }
    ]
}"#;

#[test]
fn page_bindings_scrub_over_anchored_ranges() {
    let page = PageDef::from_json_str(SCRUB_PAGE).unwrap();
    let engine = page.build_engine().unwrap();
    assert_eq!(engine.registry().len(), 1);
    let handle = engine.registry().handle_of(&BindingKey::from("about-line")).unwrap();
    // "top bottom" to "bottom top": 1000 - 800 through 1800.
    assert_eq!(
        engine.registry().range(handle),
        Some(crate::foundation::core::ScrollRange { start: 200.0, end: 1800.0 })
    );
}

#[test]
fn page_bindings_reject_pin_mode_and_duplicate_keys() {
    let mut page = PageDef::from_json_str(SCRUB_PAGE).unwrap();
    page.bindings[0].mode = BindingMode::Pin(ScrubSmoothing::Immediate);
    assert!(matches!(page.build_engine().unwrap_err(), CineError::Validation(_)));

    let mut page = PageDef::from_json_str(SCRUB_PAGE).unwrap();
    page.bindings.push(page.bindings[0].clone());
    assert!(matches!(page.build_engine().unwrap_err(), CineError::DuplicateBinding(_)));
}

#[test]
fn trace_events_are_flat_and_ordered() {
    let trace = InputTrace::from_json_str(TRACE).unwrap();
    assert_eq!(trace.0[0].input, InputEvent::Wheel { delta_px: 500.0 });
    assert_eq!(trace.0[5].input, InputEvent::Release);
    assert_eq!(trace.end_ms(), 8000.0);

    let err = InputTrace::from_json_str(
        r#"[{ "at_ms": 20.0, "kind": "release" }, { "at_ms": 10.0, "kind": "release" }]"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("out of order"));
    assert_eq!(InputTrace::default().end_ms(), 0.0);
}
