use std::fs;
use std::path::Path;

use dpm_contract::hash::stable_hash_string;
use dpm_contract::serde::from_yaml_slice;
use dpm_core::errors::{DpmError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Thresholds parameterising the ship contract catalog.
///
/// Every bound is inclusive: a deviation equal to the threshold passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipPolicy {
    /// Position tracking and estimation bound in metres.
    #[serde(default = "ShipPolicy::default_position_threshold")]
    pub position_threshold: f64,
    /// Velocity tracking and estimation bound in metres per second.
    #[serde(default = "ShipPolicy::default_velocity_threshold")]
    pub velocity_threshold: f64,
    /// Operational wind speed limit in metres per second.
    #[serde(default = "ShipPolicy::default_wind_speed_limit")]
    pub wind_speed_limit: f64,
    /// Operational significant wave height limit in metres.
    #[serde(default = "ShipPolicy::default_wave_height_limit")]
    pub wave_height_limit: f64,
    /// Operational planar current speed limit in metres per second.
    #[serde(default = "ShipPolicy::default_current_speed_limit")]
    pub current_speed_limit: f64,
    /// Largest tolerated setpoint gradient before the reference counts as spiky.
    #[serde(default = "ShipPolicy::default_reference_spike")]
    pub reference_spike: f64,
    /// Force below which a thruster counts as idle.
    #[serde(default = "ShipPolicy::default_thruster_idle")]
    pub thruster_idle: f64,
    /// Per-thruster force limits in newtons.
    #[serde(default = "ShipPolicy::default_thruster_limits")]
    pub thruster_limits: Vec<f64>,
    /// Vessel state estimation accuracy bound.
    #[serde(default = "ShipPolicy::default_state_accuracy")]
    pub state_accuracy: f64,
    /// Disturbance estimation accuracy bound.
    #[serde(default = "ShipPolicy::default_disturbance_accuracy")]
    pub disturbance_accuracy: f64,
    /// Largest tolerated thrust allocation error norm.
    #[serde(default = "ShipPolicy::default_allocation_threshold")]
    pub allocation_threshold: f64,
    /// Largest tolerated deviation between commanded and realised thrust.
    #[serde(default = "ShipPolicy::default_response_tolerance")]
    pub response_tolerance: f64,
}

impl ShipPolicy {
    const fn default_position_threshold() -> f64 {
        1.0
    }

    const fn default_velocity_threshold() -> f64 {
        0.4
    }

    const fn default_wind_speed_limit() -> f64 {
        20.0
    }

    const fn default_wave_height_limit() -> f64 {
        2.5
    }

    const fn default_current_speed_limit() -> f64 {
        0.8
    }

    const fn default_reference_spike() -> f64 {
        10.0
    }

    const fn default_thruster_idle() -> f64 {
        1e-3
    }

    fn default_thruster_limits() -> Vec<f64> {
        vec![125_000.0, 150_000.0, 125_000.0, 300_000.0, 300_000.0]
    }

    const fn default_state_accuracy() -> f64 {
        2.0
    }

    const fn default_disturbance_accuracy() -> f64 {
        1_000.0
    }

    const fn default_allocation_threshold() -> f64 {
        2.0e7
    }

    const fn default_response_tolerance() -> f64 {
        2.5e7
    }

    /// Parses a policy from YAML; omitted thresholds take their defaults.
    pub fn from_yaml(data: &[u8]) -> Result<Self, DpmError> {
        let policy: Self = from_yaml_slice(data)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Loads a policy from a YAML file.
    pub fn load(path: &Path) -> Result<Self, DpmError> {
        let bytes = fs::read(path).map_err(|err| {
            DpmError::Io(
                ErrorInfo::new("policy_read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml(&bytes)
    }

    /// Rejects negative or non-finite thresholds.
    pub fn validate(&self) -> Result<(), DpmError> {
        let scalars = [
            ("position_threshold", self.position_threshold),
            ("velocity_threshold", self.velocity_threshold),
            ("wind_speed_limit", self.wind_speed_limit),
            ("wave_height_limit", self.wave_height_limit),
            ("current_speed_limit", self.current_speed_limit),
            ("reference_spike", self.reference_spike),
            ("thruster_idle", self.thruster_idle),
            ("state_accuracy", self.state_accuracy),
            ("disturbance_accuracy", self.disturbance_accuracy),
            ("allocation_threshold", self.allocation_threshold),
            ("response_tolerance", self.response_tolerance),
        ];
        let limits = self
            .thruster_limits
            .iter()
            .map(|limit| ("thruster_limits", *limit));
        for (name, value) in scalars.into_iter().chain(limits) {
            if !value.is_finite() || value < 0.0 {
                return Err(DpmError::Contract(
                    ErrorInfo::new("invalid-threshold", "thresholds must be finite and non-negative")
                        .with_context("field", name)
                        .with_context("value", value.to_string()),
                ));
            }
        }
        Ok(())
    }

    /// Content hash recorded in run provenance.
    pub fn stable_hash(&self) -> Result<String, DpmError> {
        stable_hash_string(self)
    }
}

impl Default for ShipPolicy {
    fn default() -> Self {
        Self {
            position_threshold: Self::default_position_threshold(),
            velocity_threshold: Self::default_velocity_threshold(),
            wind_speed_limit: Self::default_wind_speed_limit(),
            wave_height_limit: Self::default_wave_height_limit(),
            current_speed_limit: Self::default_current_speed_limit(),
            reference_spike: Self::default_reference_spike(),
            thruster_idle: Self::default_thruster_idle(),
            thruster_limits: Self::default_thruster_limits(),
            state_accuracy: Self::default_state_accuracy(),
            disturbance_accuracy: Self::default_disturbance_accuracy(),
            allocation_threshold: Self::default_allocation_threshold(),
            response_tolerance: Self::default_response_tolerance(),
        }
    }
}
