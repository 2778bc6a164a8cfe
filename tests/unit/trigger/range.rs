use super::*;
use crate::foundation::core::{Rect, Size};
use crate::host::StaticLayout;

fn layout() -> StaticLayout {
    StaticLayout::new(Size::new(1440.0, 900.0), 6000.0)
        .with_region("about", Rect::new(0.0, 1800.0, 1440.0, 2700.0))
}

#[test]
fn anchors_parse_from_keywords_and_percentages() {
    assert_eq!("top top".parse::<ScrollAnchor>().unwrap(), ScrollAnchor::TOP_TOP);
    assert_eq!("bottom top".parse::<ScrollAnchor>().unwrap(), ScrollAnchor::BOTTOM_TOP);
    assert_eq!(
        "top 80%".parse::<ScrollAnchor>().unwrap(),
        ScrollAnchor::new(0.0, 0.8)
    );
    assert_eq!(
        "left 40% -12".parse::<ScrollAnchor>().unwrap(),
        ScrollAnchor::new(0.0, 0.4).with_offset(-12.0)
    );
    for bad in ["", "top", "middle top", "top top px", "top top 1 2"] {
        assert!(bad.parse::<ScrollAnchor>().is_err(), "{bad:?}");
    }
}

#[test]
fn anchored_ranges_resolve_against_region_and_viewport() {
    let l = layout();
    let scene = RangeSpec::between("about", ScrollAnchor::BOTTOM_BOTTOM, ScrollAnchor::BOTTOM_TOP);
    assert_eq!(scene.resolve(&l), Some(ScrollRange { start: 1800.0, end: 2700.0 }));

    let reveal = RangeSpec::Anchored {
        region: "about".into(),
        start: ScrollAnchor::new(0.0, 0.8),
        end: RangeEnd::Length(500.0),
    };
    assert_eq!(reveal.resolve(&l), Some(ScrollRange { start: 1080.0, end: 1580.0 }));

    let to_end = RangeSpec::Anchored {
        region: "about".into(),
        start: ScrollAnchor::TOP_TOP,
        end: RangeEnd::Max,
    };
    assert_eq!(to_end.resolve(&l), Some(ScrollRange { start: 1800.0, end: 5100.0 }));
}

#[test]
fn missing_region_resolves_to_none() {
    let spec = RangeSpec::between("ghost", ScrollAnchor::TOP_TOP, ScrollAnchor::BOTTOM_TOP);
    assert_eq!(spec.resolve(&layout()), None);
    assert_eq!(spec.region(), Some(&RegionId::new("ghost")));
}

#[test]
fn backwards_anchors_collapse_instead_of_failing() {
    let spec = RangeSpec::between("about", ScrollAnchor::BOTTOM_TOP, ScrollAnchor::TOP_TOP);
    let range = spec.resolve(&layout()).unwrap();
    assert!(range.is_degenerate());
    assert_eq!(range.progress(2000.0), 0.0);
}

#[test]
fn range_specs_deserialize_with_anchor_strings() {
    let spec: RangeSpec = serde_json::from_str(
        r#"{"anchored": {"region": "about", "start": "top 60%", "end": {"anchor": "center center"}}}"#,
    )
    .unwrap();
    assert_eq!(
        spec,
        RangeSpec::between("about", ScrollAnchor::new(0.0, 0.6), ScrollAnchor::CENTER_CENTER)
    );
    let abs: RangeSpec = serde_json::from_str(r#"{"absolute": {"start": 1000.0, "end": 2000.0}}"#).unwrap();
    assert_eq!(abs, RangeSpec::absolute(1000.0, 2000.0).unwrap());
}

#[test]
fn anchors_print_as_authored() {
    for text in ["left 60%", "top 80%", "center 33% -12"] {
        let a: ScrollAnchor = text.parse().unwrap();
        let printed = a.to_string();
        assert_eq!(printed.parse::<ScrollAnchor>().unwrap(), a);
    }
    let a: ScrollAnchor = "left 60%".parse().unwrap();
    assert_eq!(a.to_string(), "0% 60%");
}
