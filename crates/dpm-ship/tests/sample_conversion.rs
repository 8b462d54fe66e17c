mod common;

use std::fs;

use common::healthy_sample;
use dpm_contract::Value;
use dpm_ship::{ShipSample, Trajectory};

#[test]
fn current_speed_uses_the_planar_components() {
    let sample = healthy_sample(0.0);
    assert_eq!(sample.current_speed(), Some(0.5));
    let snapshot = sample.to_snapshot(3);
    assert_eq!(snapshot.tick, 3);
    assert_eq!(snapshot.get("current_speed"), Some(&Value::Scalar(0.5)));
    assert_eq!(
        snapshot.get("disturbance_estimate"),
        Some(&Value::Vector(vec![8.0, 1.5, 0.5]))
    );
}

#[test]
fn allocation_error_is_derived_from_demand_and_realised_force() {
    let snapshot = healthy_sample(0.0).to_snapshot(0);
    assert_eq!(
        snapshot.get("allocation_error"),
        Some(&Value::Vector(vec![10.0, 5.0, 2.0]))
    );

    let mut mismatched = healthy_sample(0.0);
    mismatched.thrust_dynamic_force = Some(vec![1.0]);
    assert!(mismatched.to_snapshot(0).get("allocation_error").is_none());
}

#[test]
fn absent_signals_stay_absent() {
    let snapshot = ShipSample::default().to_snapshot(0);
    assert!(snapshot.values.is_empty());

    let short_current = ShipSample {
        current: Some(vec![0.2]),
        ..ShipSample::default()
    };
    assert_eq!(short_current.current_speed(), None);
}

#[test]
fn flags_are_carried_as_flags() {
    let mut sample = healthy_sample(0.0);
    sample.setpoints_valid = Some(false);
    let snapshot = sample.to_snapshot(0);
    assert_eq!(snapshot.flag("setpoints_valid"), Some(false));
    assert_eq!(snapshot.flag("sensors_available"), Some(true));
}

#[test]
fn trajectory_json_loads_with_sparse_samples() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{"samples": [
            {"time": 0.0, "eta": [0.0, 0.0, 0.0], "wind_speed": 4.0},
            {"time": 0.1, "eta": [0.1, 0.0, 0.0], "sensors_available": false}
        ]}"#,
    )
    .expect("write");
    let trajectory = Trajectory::load(&path).expect("load");
    let snapshots: Vec<_> = trajectory.snapshots().collect();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[1].tick, 1);
    assert_eq!(snapshots[1].timestamp, 0.1);
    assert_eq!(snapshots[0].get("wind_speed"), Some(&Value::Scalar(4.0)));
    assert_eq!(snapshots[1].flag("sensors_available"), Some(false));
    assert!(snapshots[1].get("wind_speed").is_none());
}

#[test]
fn missing_trajectory_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let err = Trajectory::load(&dir.path().join("absent.json")).expect_err("missing");
    assert_eq!(err.info().code, "trajectory_read");
}
