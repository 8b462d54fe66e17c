use std::fs;

use dpm_core::errors::DpmError;
use dpm_ship::{ship_catalog, ShipPolicy};
use proptest::prelude::*;

#[test]
fn yaml_overrides_keep_other_defaults() -> Result<(), DpmError> {
    let policy = ShipPolicy::from_yaml(b"position_threshold: 2.0\nthruster_limits: [1.0, 2.0]\n")?;
    assert_eq!(policy.position_threshold, 2.0);
    assert_eq!(policy.thruster_limits, vec![1.0, 2.0]);
    assert_eq!(policy.velocity_threshold, 0.4);
    assert_eq!(policy.wind_speed_limit, 20.0);
    assert_eq!(policy.reference_spike, 10.0);
    Ok(())
}

#[test]
fn empty_yaml_is_the_default_policy() -> Result<(), DpmError> {
    assert_eq!(ShipPolicy::from_yaml(b"{}")?, ShipPolicy::default());
    Ok(())
}

#[test]
fn negative_thresholds_are_configuration_errors() {
    let err = ShipPolicy::from_yaml(b"wave_height_limit: -1.0\n").expect_err("negative");
    assert!(err.is_configuration());
    assert_eq!(err.info().code, "invalid-threshold");
    assert_eq!(
        err.info().context.get("field").map(String::as_str),
        Some("wave_height_limit")
    );

    let mut policy = ShipPolicy::default();
    policy.thruster_limits[2] = f64::NAN;
    let err = ship_catalog(&policy).expect_err("nan limit");
    assert_eq!(err.info().context.get("field").map(String::as_str), Some("thruster_limits"));
}

#[test]
fn policy_file_loads() -> Result<(), DpmError> {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("policy.yaml");
    fs::write(&path, "current_speed_limit: 1.2\n").expect("write");
    assert_eq!(ShipPolicy::load(&path)?.current_speed_limit, 1.2);
    Ok(())
}

proptest! {
    #[test]
    fn hash_tracks_threshold_changes(threshold in 0.01f64..50.0) {
        let base = ShipPolicy::default();
        let changed = ShipPolicy { position_threshold: threshold, ..ShipPolicy::default() };
        let same = threshold == base.position_threshold;
        prop_assert_eq!(base.stable_hash().expect("hash") == changed.stable_hash().expect("hash"), same);
    }
}
