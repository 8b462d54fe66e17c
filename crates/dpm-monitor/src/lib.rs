#![deny(missing_docs)]
#![doc = "Subsystem graph, composite aggregation, violation recording and the tick-driven contract monitor."]

/// Composite aggregation over the subsystem graph.
pub mod aggregate;
/// Monitor configuration.
pub mod config;
/// The tick-driven monitor.
pub mod engine;
/// Subsystem dependency DAG.
pub mod graph;
/// Per-subsystem status histories.
pub mod history;
/// Append-only violation log.
pub mod recorder;

pub use aggregate::{root_verdict, upstream_verdicts};
pub use config::MonitorOpts;
pub use engine::{Monitor, TickReport};
pub use graph::{EdgeSpec, GraphSpec, SubsystemGraph, SubsystemGraphBuilder};
pub use history::StatusHistory;
pub use recorder::ViolationRecorder;
