use dpm_core::errors::DpmError;
use dpm_monitor::{Monitor, MonitorOpts, SubsystemGraph, SubsystemGraphBuilder};

use crate::catalog::{extended_catalog, ship_catalog};
use crate::policy::ShipPolicy;
use crate::subsystems::{
    DISTURBANCE, DP, OBSERVER, REFERENCE, SHIP, SITAW, THRUSTER_DYNAMICS, THRUST, THRUST_ALLOCATION,
};

fn core_builder() -> SubsystemGraphBuilder {
    SubsystemGraph::builder()
        .node(DISTURBANCE)
        .node(REFERENCE)
        .node(OBSERVER)
        .node(DP)
        .node(THRUST)
        .node(SHIP)
        .edge(DISTURBANCE, OBSERVER)
        .edge(REFERENCE, OBSERVER)
        .edge(OBSERVER, DP)
        .edge(DP, THRUST)
        .edge(DISTURBANCE, SHIP)
        .edge(REFERENCE, SHIP)
        .edge(OBSERVER, SHIP)
        .edge(DP, SHIP)
        .edge(THRUST, SHIP)
}

/// Default graph: disturbance and reference feed the observer, then the DP
/// controller, then thrust, and every one of them feeds the ship root.
pub fn ship_graph() -> Result<SubsystemGraph, DpmError> {
    core_builder().build()
}

/// [`ship_graph`] plus the extended subsystems.
///
/// They are ordered after the subsystems they observe but have no path to
/// the ship root, so their verdicts never change the ship verdict.
pub fn extended_graph() -> Result<SubsystemGraph, DpmError> {
    core_builder()
        .node(SITAW)
        .node(THRUST_ALLOCATION)
        .node(THRUSTER_DYNAMICS)
        .edge(OBSERVER, SITAW)
        .edge(DP, THRUST_ALLOCATION)
        .edge(THRUST_ALLOCATION, THRUSTER_DYNAMICS)
        .build()
}

/// Monitor over [`ship_catalog`] and [`ship_graph`].
pub fn ship_monitor(policy: &ShipPolicy, opts: MonitorOpts) -> Result<Monitor, DpmError> {
    Monitor::new(ship_catalog(policy)?, ship_graph()?, opts)
}

/// Monitor over [`extended_catalog`] and [`extended_graph`].
pub fn extended_monitor(policy: &ShipPolicy, opts: MonitorOpts) -> Result<Monitor, DpmError> {
    Monitor::new(extended_catalog(policy)?, extended_graph()?, opts)
}
