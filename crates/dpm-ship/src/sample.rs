use std::fs;
use std::path::Path;

use dpm_contract::numeric::euclidean_norm;
use dpm_contract::serde::from_json_slice;
use dpm_contract::Snapshot;
use dpm_core::errors::{DpmError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Raw signals of one simulation step.
///
/// Every field is optional; an absent or NaN signal is reported by the
/// contracts that need it, never rejected here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipSample {
    /// Simulation time in seconds.
    pub time: f64,
    /// Measured pose `[x, y, yaw]`.
    pub eta: Option<Vec<f64>>,
    /// Measured body velocity `[u, v, r]`.
    pub nu: Option<Vec<f64>>,
    /// Reference pose setpoint.
    pub eta_sp: Option<Vec<f64>>,
    /// Reference velocity setpoint.
    pub nu_sp: Option<Vec<f64>>,
    /// Observer pose estimate.
    pub eta_obs: Option<Vec<f64>>,
    /// Observer velocity estimate.
    pub nu_obs: Option<Vec<f64>>,
    /// Controller force demand.
    pub tau: Option<Vec<f64>>,
    /// Per-thruster forces.
    pub thruster_forces: Option<Vec<f64>>,
    /// Force realised by the thruster dynamics.
    pub thrust_dynamic_force: Option<Vec<f64>>,
    /// Wind speed.
    pub wind_speed: Option<f64>,
    /// Significant wave height.
    pub wave_height: Option<f64>,
    /// Current velocity in the body frame; only the planar part is used.
    pub current: Option<Vec<f64>>,
    /// Health of the disturbance sensors.
    pub disturbance_sensor_available: Option<bool>,
    /// Health of the position sensors and voting.
    pub sensors_available: Option<bool>,
    /// Validity flag published by the reference model.
    pub setpoints_valid: Option<bool>,
    /// Ground-truth disturbance magnitudes `[wind, wave, current]`.
    pub disturbance_true: Option<Vec<f64>>,
    /// Estimated disturbance magnitudes; derived from the measured ones when absent.
    pub disturbance_estimate: Option<Vec<f64>>,
    /// Thruster configuration, one entry per installed thruster.
    pub thruster_config: Option<Vec<f64>>,
    /// Whether the allocator converged.
    pub allocation_success: Option<bool>,
    /// Allocation residual; derived as `tau - thrust_dynamic_force` when absent.
    pub allocation_error: Option<Vec<f64>>,
    /// Health of all actuators.
    pub actuators_healthy: Option<bool>,
}

impl ShipSample {
    /// Planar current speed, `|(current_x, current_y)|`.
    pub fn current_speed(&self) -> Option<f64> {
        let current = self.current.as_ref()?;
        if current.len() < 2 {
            return None;
        }
        Some(euclidean_norm(&current[..2]))
    }

    fn derived_disturbance_estimate(&self) -> Option<Vec<f64>> {
        if let Some(estimate) = &self.disturbance_estimate {
            return Some(estimate.clone());
        }
        Some(vec![self.wind_speed?, self.wave_height?, self.current_speed()?])
    }

    fn derived_allocation_error(&self) -> Option<Vec<f64>> {
        if let Some(error) = &self.allocation_error {
            return Some(error.clone());
        }
        let (tau, realised) = (self.tau.as_ref()?, self.thrust_dynamic_force.as_ref()?);
        if tau.len() != realised.len() {
            return None;
        }
        Some(tau.iter().zip(realised).map(|(a, b)| a - b).collect())
    }

    /// Converts the sample into the snapshot observed at `tick`.
    pub fn to_snapshot(&self, tick: u64) -> Snapshot {
        let mut snapshot = Snapshot::new(tick, self.time)
            .with_optional_vector("eta", self.eta.clone())
            .with_optional_vector("nu", self.nu.clone())
            .with_optional_vector("eta_sp", self.eta_sp.clone())
            .with_optional_vector("nu_sp", self.nu_sp.clone())
            .with_optional_vector("eta_obs", self.eta_obs.clone())
            .with_optional_vector("nu_obs", self.nu_obs.clone())
            .with_optional_vector("tau", self.tau.clone())
            .with_optional_vector("thruster_forces", self.thruster_forces.clone())
            .with_optional_vector("thrust_dynamic_force", self.thrust_dynamic_force.clone())
            .with_optional_scalar("wind_speed", self.wind_speed)
            .with_optional_scalar("wave_height", self.wave_height)
            .with_optional_scalar("current_speed", self.current_speed())
            .with_optional_vector("disturbance_true", self.disturbance_true.clone())
            .with_optional_vector("disturbance_estimate", self.derived_disturbance_estimate())
            .with_optional_vector("thruster_config", self.thruster_config.clone())
            .with_optional_vector("allocation_error", self.derived_allocation_error());
        let flags = [
            ("disturbance_sensor_available", self.disturbance_sensor_available),
            ("sensors_available", self.sensors_available),
            ("setpoints_valid", self.setpoints_valid),
            ("allocation_success", self.allocation_success),
            ("actuators_healthy", self.actuators_healthy),
        ];
        for (name, value) in flags {
            if let Some(value) = value {
                snapshot = snapshot.with_flag(name, value);
            }
        }
        snapshot
    }
}

/// A recorded run: one sample per simulation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Samples in time order.
    #[serde(default)]
    pub samples: Vec<ShipSample>,
}

impl Trajectory {
    /// Loads a trajectory from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DpmError> {
        let bytes = fs::read(path).map_err(|err| {
            DpmError::Io(
                ErrorInfo::new("trajectory_read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_json_slice(&bytes)
    }

    /// Snapshots with ticks numbered from zero in sample order.
    pub fn snapshots(&self) -> impl Iterator<Item = Snapshot> + '_ {
        self.samples
            .iter()
            .enumerate()
            .map(|(tick, sample)| sample.to_snapshot(tick as u64))
    }
}
