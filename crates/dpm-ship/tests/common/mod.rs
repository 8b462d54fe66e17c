#![allow(dead_code)]

use dpm_ship::ShipSample;

/// A calm, healthy station-keeping step.
pub fn healthy_sample(time: f64) -> ShipSample {
    ShipSample {
        time,
        eta: Some(vec![10.0, 5.0, 0.1]),
        nu: Some(vec![0.1, 0.0, 0.0]),
        eta_sp: Some(vec![10.2, 5.1, 0.1]),
        nu_sp: Some(vec![0.1, 0.0, 0.0]),
        eta_obs: Some(vec![10.1, 5.0, 0.1]),
        nu_obs: Some(vec![0.12, 0.0, 0.0]),
        tau: Some(vec![1000.0, 500.0, 200.0]),
        thruster_forces: Some(vec![10_000.0, 20_000.0, 15_000.0, 50_000.0, 60_000.0]),
        thrust_dynamic_force: Some(vec![990.0, 495.0, 198.0]),
        wind_speed: Some(8.0),
        wave_height: Some(1.5),
        current: Some(vec![0.0, 0.5, 0.05]),
        disturbance_sensor_available: Some(true),
        sensors_available: Some(true),
        setpoints_valid: Some(true),
        disturbance_true: Some(vec![8.0, 1.5, 0.5]),
        disturbance_estimate: None,
        thruster_config: Some(vec![1.0; 5]),
        allocation_success: Some(true),
        allocation_error: None,
        actuators_healthy: Some(true),
    }
}
