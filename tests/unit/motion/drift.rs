use super::*;

fn def() -> DriftDef {
    DriftDef {
        watch: "hero".into(),
        rows: vec![
            DriftRow { region: "row-1".into(), factor: -1.0 },
            DriftRow { region: "row-2".into(), factor: 0.9 },
        ],
    }
}

#[test]
fn rows_drift_in_opposite_directions_at_base_speed() {
    let mut drift = Drift::new(&def(), DriftConfig::default());
    let mut stage = Stage::new();
    drift.step(1000.0 / 60.0, &mut stage);
    let pos: Vec<f64> = drift.positions().collect();
    // 0.04 * (16.67 * 0.06) ≈ 0.04 percent per frame.
    assert!((pos[0] - (-25.04)).abs() < 1e-9);
    assert!((pos[1] - (-25.0 + 0.9 * 0.04)).abs() < 1e-9);
    assert_eq!(stage.get(&"row-1".into(), Prop::XPercent), pos[0]);
}

#[test]
fn velocity_boost_is_capped_and_eased() {
    let mut drift = Drift::new(&def(), DriftConfig::default());
    let mut stage = Stage::new();
    drift.observe(2.0);
    assert!((drift.target_speed() - (0.04 + 0.5)).abs() < 1e-12);
    drift.observe(-50.0);
    assert!((drift.target_speed() - (0.04 + 1.2)).abs() < 1e-12);

    drift.step(16.0, &mut stage);
    let after_one = drift.speed();
    assert!((after_one - (0.04 + 1.2 * 0.08)).abs() < 1e-12);

    drift.observe(0.0);
    for _ in 0..400 {
        drift.step(16.0, &mut stage);
    }
    assert!((drift.speed() - 0.04).abs() < 1e-9);
}

#[test]
fn positions_wrap_within_one_run() {
    let mut drift = Drift::new(&def(), DriftConfig::default());
    let mut stage = Stage::new();
    drift.observe(100.0);
    for _ in 0..5000 {
        drift.step(16.0, &mut stage);
        for p in drift.positions() {
            assert!(p > -50.0 && p < 0.0, "escaped wrap window: {p}");
        }
    }
}
