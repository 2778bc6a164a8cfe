use super::*;

#[test]
fn max_scroll_never_negative() {
    let short = StaticLayout::new(Size::new(1280.0, 800.0), 600.0);
    assert_eq!(short.max_scroll(), 0.0);
    let long = StaticLayout::new(Size::new(1280.0, 800.0), 5000.0);
    assert_eq!(long.max_scroll(), 4200.0);
}

#[test]
fn regions_can_move_and_disappear() {
    let mut layout = StaticLayout::new(Size::new(1280.0, 800.0), 5000.0)
        .with_region("hero", Rect::new(0.0, 0.0, 1280.0, 800.0));
    let hero = RegionId::new("hero");
    assert_eq!(layout.region(&hero), Some(Rect::new(0.0, 0.0, 1280.0, 800.0)));

    layout.set_region("hero", Rect::new(0.0, 0.0, 1280.0, 900.0));
    assert_eq!(layout.region(&hero).map(|r| r.height()), Some(900.0));

    layout.remove_region(&hero);
    assert_eq!(layout.region(&hero), None);
}

#[test]
fn layout_deserializes_from_json() {
    let json = r#"{
        "viewport": {"width": 1440.0, "height": 900.0},
        "document_height": 6000.0,
        "regions": {"about": {"x0": 0.0, "y0": 900.0, "x1": 1440.0, "y1": 1800.0}}
    }"#;
    let layout: StaticLayout = serde_json::from_str(json).unwrap();
    assert_eq!(layout.viewport().width, 1440.0);
    assert_eq!(
        layout.region(&RegionId::new("about")).map(|r| r.y0),
        Some(900.0)
    );
}
