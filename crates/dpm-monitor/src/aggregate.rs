use std::collections::BTreeMap;

use dpm_contract::ContractStatus;
use dpm_core::{aggregate, SubsystemId, TriState};

use crate::graph::SubsystemGraph;

/// Effective guarantees of the direct predecessors of `id`.
///
/// This is the only upstream information handed to a contract, so an
/// `upstream` predicate can only observe subsystems wired in the graph.
pub fn upstream_verdicts(
    graph: &SubsystemGraph,
    id: &str,
    effective: &BTreeMap<SubsystemId, TriState>,
) -> BTreeMap<SubsystemId, TriState> {
    graph
        .predecessors(id)
        .iter()
        .filter_map(|pred| effective.get(pred).map(|verdict| (pred.clone(), *verdict)))
        .collect()
}

/// Verdict of `root`: its own guarantees plus the effective guarantee of every
/// subsystem with a path to it.
///
/// Subsystems without a path to the root are ignored. A contributor without a
/// status counts as `Indeterminate`.
pub fn root_verdict(
    graph: &SubsystemGraph,
    root: &str,
    statuses: &BTreeMap<SubsystemId, ContractStatus>,
) -> TriState {
    let own = statuses
        .get(root)
        .map_or(TriState::Indeterminate, ContractStatus::effective_guarantee);
    let upstream = graph.contributors(root).into_iter().map(|id| {
        statuses
            .get(&id)
            .map_or(TriState::Indeterminate, ContractStatus::effective_guarantee)
    });
    aggregate(std::iter::once(own).chain(upstream))
}
