#![allow(dead_code)]

use dpm_contract::{ContractDefinition, PredicateSpec, Snapshot};
use dpm_core::errors::DpmError;
use dpm_monitor::{Monitor, MonitorOpts, SubsystemGraph};

/// `up -> down -> root`, plus an `orphan` leaf with no path to `root`.
pub fn chain_graph() -> Result<SubsystemGraph, DpmError> {
    SubsystemGraph::builder()
        .node("up")
        .node("down")
        .node("root")
        .node("orphan")
        .edge("up", "down")
        .edge("down", "root")
        .build()
}

pub fn chain_definitions() -> Result<Vec<ContractDefinition>, DpmError> {
    Ok(vec![
        ContractDefinition::builder("up")
            .assumption("A1", "up input missing.", PredicateSpec::available(["x"]))
            .guarantee("G1", "up failed.", PredicateSpec::flag("up_ok"), &["A1"])
            .build()?,
        ContractDefinition::builder("down")
            .assumption("A1", "Upstream is not functioning.", PredicateSpec::upstream(["up"]))
            .guarantee("G1", "down output invalid.", PredicateSpec::flag("down_ok"), &["A1"])
            .guarantee("G2", "down output late.", PredicateSpec::flag("down_ok"), &["A1"])
            .build()?,
        ContractDefinition::builder("root")
            .assumption("A1", "Chain is not functioning.", PredicateSpec::upstream(["down"]))
            .guarantee("G1", "root failed.", PredicateSpec::flag("root_ok"), &[])
            .build()?,
        ContractDefinition::builder("orphan")
            .guarantee("G1", "orphan failed.", PredicateSpec::flag("orphan_ok"), &[])
            .build()?,
    ])
}

pub fn chain_monitor(concurrency: usize) -> Result<Monitor, DpmError> {
    let opts = MonitorOpts {
        concurrency,
        root: "root".into(),
        ..MonitorOpts::default()
    };
    Monitor::new(chain_definitions()?, chain_graph()?, opts)
}

/// Snapshot where every chain check holds unless listed in `failing`.
pub fn chain_snapshot(tick: u64, failing: &[&str]) -> Snapshot {
    let flag = |name: &str| !failing.contains(&name);
    Snapshot::new(tick, tick as f64 * 0.1)
        .with_scalar("x", 1.0)
        .with_flag("up_ok", flag("up_ok"))
        .with_flag("down_ok", flag("down_ok"))
        .with_flag("root_ok", flag("root_ok"))
        .with_flag("orphan_ok", flag("orphan_ok"))
}
