#![deny(missing_docs)]
#![doc = "Dynamic-positioning domain: thresholds, raw samples, the contract catalog and the default subsystem graph."]

/// Ship subsystem contracts.
pub mod catalog;
/// Default subsystem graphs and monitor constructors.
pub mod graph;
/// Catalog thresholds.
pub mod policy;
/// Raw simulation samples.
pub mod sample;

/// Names of the monitored subsystems.
pub mod subsystems {
    /// Environmental disturbance model.
    pub const DISTURBANCE: &str = "disturbance";
    /// Reference trajectory model.
    pub const REFERENCE: &str = "reference";
    /// State observer.
    pub const OBSERVER: &str = "observer";
    /// Dynamic-positioning controller.
    pub const DP: &str = "dp";
    /// Thrust model.
    pub const THRUST: &str = "thrust";
    /// Whole-vessel contract, the default root.
    pub const SHIP: &str = "ship";
    /// Situational awareness.
    pub const SITAW: &str = "sitaw";
    /// Thrust allocation.
    pub const THRUST_ALLOCATION: &str = "thrust_allocation";
    /// Thruster actuator dynamics.
    pub const THRUSTER_DYNAMICS: &str = "thruster_dynamics";
}

pub use catalog::{extended_catalog, ship_catalog};
pub use graph::{extended_graph, extended_monitor, ship_graph, ship_monitor};
pub use policy::ShipPolicy;
pub use sample::{ShipSample, Trajectory};
