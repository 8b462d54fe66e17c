use dpm_contract::{CheckOutcome, ContractDefinition, EvalContext, FnPredicate, PredicateSpec};
use dpm_core::errors::DpmError;

use crate::policy::ShipPolicy;
use crate::subsystems::{
    DISTURBANCE, DP, OBSERVER, REFERENCE, SHIP, SITAW, THRUSTER_DYNAMICS, THRUST, THRUST_ALLOCATION,
};

/// Contracts of the six monitored subsystems, in graph declaration order.
pub fn ship_catalog(policy: &ShipPolicy) -> Result<Vec<ContractDefinition>, DpmError> {
    policy.validate()?;
    Ok(vec![
        disturbance()?,
        reference(policy)?,
        observer(policy)?,
        dp(policy)?,
        thrust(policy)?,
        ship(policy)?,
    ])
}

/// [`ship_catalog`] plus the estimation, allocation and actuator contracts.
pub fn extended_catalog(policy: &ShipPolicy) -> Result<Vec<ContractDefinition>, DpmError> {
    let mut catalog = ship_catalog(policy)?;
    catalog.push(sitaw(policy)?);
    catalog.push(thrust_allocation(policy)?);
    catalog.push(thruster_dynamics(policy)?);
    Ok(catalog)
}

fn disturbance() -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder(DISTURBANCE)
        .assumption(
            "A1",
            "Position data (eta) unavailable for environmental modeling.",
            PredicateSpec::available(["eta"]),
        )
        .assumption(
            "A2",
            "Environmental data (wind/wave/current) not available.",
            PredicateSpec::flag("disturbance_sensor_available"),
        )
        .guarantee(
            "G1",
            "Environment model output is not realistic or valid.",
            PredicateSpec::available(["wind_speed", "wave_height", "current_speed"]),
            &["A1", "A2"],
        )
        .build()
}

fn reference(policy: &ShipPolicy) -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder(REFERENCE)
        .assumption(
            "A1",
            "Setpoints eta_sp or nu_sp are missing.",
            PredicateSpec::available(["eta_sp", "nu_sp"]),
        )
        .guarantee(
            "G1",
            "Trajectory setpoints are not valid or contain anomalies.",
            PredicateSpec::flag("setpoints_valid"),
            &["A1"],
        )
        .guarantee(
            "G2",
            "Setpoints are not smoothed properly.",
            PredicateSpec::Smoothness {
                field: "eta_sp".into(),
                threshold: policy.reference_spike,
            },
            &["A1"],
        )
        .build()
}

fn observer(policy: &ShipPolicy) -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder(OBSERVER)
        .assumption("A1", "Position data (eta) is missing.", PredicateSpec::available(["eta"]))
        .assumption(
            "A2",
            "Position sensors or voting system unavailable.",
            PredicateSpec::flag("sensors_available"),
        )
        .assumption(
            "A3",
            "Force estimate (tau_est) is missing.",
            PredicateSpec::available(["tau"]),
        )
        .assumption(
            "A4",
            "Upstream models are not functioning.",
            PredicateSpec::upstream([DISTURBANCE, REFERENCE]),
        )
        .guarantee(
            "G1",
            "WMA-based position estimate is invalid.",
            PredicateSpec::component_deviation("eta_obs", "eta", policy.position_threshold),
            &["A1", "A2", "A4"],
        )
        .guarantee(
            "G2",
            "Velocity filtering is not within acceptable bounds.",
            PredicateSpec::component_deviation("nu_obs", "nu", policy.velocity_threshold),
            &["A2", "A4"],
        )
        .build()
}

fn dp(policy: &ShipPolicy) -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder(DP)
        .assumption(
            "A1",
            "Reference setpoints are missing.",
            PredicateSpec::available(["eta_sp", "nu_sp"]),
        )
        .assumption(
            "A2",
            "State estimates eta_hat or nu_hat are missing.",
            PredicateSpec::available(["eta_obs", "nu_obs"]),
        )
        .assumption(
            "A3",
            "Setpoints are not smoothed.",
            PredicateSpec::Smoothness {
                field: "eta_sp".into(),
                threshold: policy.reference_spike,
            },
        )
        .assumption(
            "A4",
            "Observer estimates are not trustworthy.",
            PredicateSpec::upstream([OBSERVER]),
        )
        .guarantee(
            "G1",
            "Control action does not reduce error.",
            PredicateSpec::available(["tau"]),
            &["A1", "A2", "A3", "A4"],
        )
        .build()
}

fn thrust(policy: &ShipPolicy) -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder(THRUST)
        .assumption("A1", "Control input tau_d is missing.", PredicateSpec::available(["tau"]))
        .assumption(
            "A2",
            "One or more thrusters are not working.",
            PredicateSpec::Active {
                field: "thruster_forces".into(),
                min: policy.thruster_idle,
            },
        )
        .assumption(
            "A3",
            "Thruster forces exceed operational limits.",
            PredicateSpec::ComponentLimits {
                field: "thruster_forces".into(),
                limits: policy.thruster_limits.clone(),
            },
        )
        .assumption(
            "A4",
            "DP control action is not trustworthy.",
            PredicateSpec::upstream([DP]),
        )
        .guarantee(
            "G1",
            "Thrust output does not match expected dynamics.",
            PredicateSpec::available(["thrust_dynamic_force"]),
            &["A1", "A2", "A3", "A4"],
        )
        .build()
}

/// Root contract. Whether the ship assumptions hold as a whole is read from
/// [`ContractStatus::assumptions_hold`](dpm_contract::ContractStatus::assumptions_hold)
/// rather than declared as a guarantee, so a failed assumption leaves G1
/// `Indeterminate` instead of producing a second violation.
fn ship(policy: &ShipPolicy) -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder(SHIP)
        .assumption(
            "A1",
            "Disturbance data is missing or incomplete.",
            PredicateSpec::available(["wind_speed", "wave_height", "current_speed"]),
        )
        .assumption(
            "A2",
            "Disturbance exceeds operational limits.",
            PredicateSpec::All {
                of: vec![
                    PredicateSpec::magnitude("wind_speed", policy.wind_speed_limit),
                    PredicateSpec::magnitude("wave_height", policy.wave_height_limit),
                    PredicateSpec::magnitude("current_speed", policy.current_speed_limit),
                ],
            },
        )
        .assumption(
            "A3",
            "Subsystem outputs are abnormal.",
            PredicateSpec::upstream([DISTURBANCE, REFERENCE, OBSERVER, DP, THRUST]),
        )
        .assumption(
            "A4",
            "State estimation is inaccurate.",
            PredicateSpec::upstream([OBSERVER]),
        )
        .guarantee(
            "G1",
            "Vessel deviates from trajectory.",
            PredicateSpec::All {
                of: vec![
                    PredicateSpec::deviation("eta", "eta_sp", policy.position_threshold),
                    PredicateSpec::deviation("nu", "nu_sp", policy.velocity_threshold),
                ],
            },
            &["A1", "A2", "A3", "A4"],
        )
        .build()
}

fn sitaw(policy: &ShipPolicy) -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder(SITAW)
        .assumption(
            "A1",
            "Ground truth for situational awareness is unavailable.",
            PredicateSpec::available(["eta", "disturbance_true"]),
        )
        .guarantee(
            "G1",
            "Disturbance estimate exceeds its accuracy bound.",
            PredicateSpec::deviation(
                "disturbance_estimate",
                "disturbance_true",
                policy.disturbance_accuracy,
            ),
            &["A1"],
        )
        .guarantee(
            "G2",
            "Vessel state estimate exceeds its accuracy bound.",
            PredicateSpec::deviation("eta_obs", "eta", policy.state_accuracy),
            &["A1"],
        )
        .build()
}

fn thrust_allocation(policy: &ShipPolicy) -> Result<ContractDefinition, DpmError> {
    let config_present = FnPredicate::new("thruster-config-present", |ctx: &EvalContext<'_>| {
        match ctx.snapshot.numeric("thruster_config") {
            Some(config) if !config.is_empty() => CheckOutcome::pass(),
            Some(_) => CheckOutcome::fail_with("thruster_config is empty"),
            None => CheckOutcome::fail_with("thruster_config unavailable"),
        }
    });
    ContractDefinition::builder(THRUST_ALLOCATION)
        .assumption("A1", "Thruster configuration is unavailable.", config_present)
        .assumption(
            "A2",
            "Thrust allocation did not converge.",
            PredicateSpec::flag("allocation_success"),
        )
        .guarantee(
            "G1",
            "Force allocation error exceeds threshold.",
            PredicateSpec::magnitude("allocation_error", policy.allocation_threshold),
            &["A1", "A2"],
        )
        .build()
}

fn thruster_dynamics(policy: &ShipPolicy) -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder(THRUSTER_DYNAMICS)
        .assumption(
            "A1",
            "One or more actuators are unhealthy.",
            PredicateSpec::flag("actuators_healthy"),
        )
        .guarantee(
            "G1",
            "Thrust realization deviates from command.",
            PredicateSpec::deviation("thrust_dynamic_force", "tau", policy.response_tolerance),
            &["A1"],
        )
        .build()
}
