use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use dpm_core::SubsystemId;
use dpm_monitor::SubsystemGraph;
use dpm_ship::{extended_graph, ship_graph};
use serde::Serialize;

use super::{load_graph, print_json};

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Graph YAML; the built-in ship graph is used when omitted.
    #[arg(long)]
    pub graph: Option<PathBuf>,
    /// Include the extended subsystems in the built-in graph.
    #[arg(long, conflicts_with = "graph")]
    pub extended: bool,
    /// Root whose contributors are listed.
    #[arg(long, default_value = "ship")]
    pub root: String,
}

#[derive(Debug, Serialize)]
struct GraphView {
    levels: Vec<Vec<SubsystemId>>,
    predecessors: Vec<(SubsystemId, Vec<SubsystemId>)>,
    root: String,
    contributors: Vec<SubsystemId>,
    unreachable: Vec<SubsystemId>,
}

pub fn run(args: &GraphArgs) -> Result<(), Box<dyn Error>> {
    let graph = match (&args.graph, args.extended) {
        (Some(path), _) => load_graph(path)?,
        (None, true) => extended_graph()?,
        (None, false) => ship_graph()?,
    };
    print_json(&view(&graph, &args.root))
}

fn view(graph: &SubsystemGraph, root: &str) -> GraphView {
    let contributors = graph.contributors(root);
    let unreachable = graph
        .nodes()
        .iter()
        .filter(|id| id.as_str() != root && !contributors.contains(*id))
        .cloned()
        .collect();
    GraphView {
        levels: graph.topological_levels().to_vec(),
        predecessors: graph
            .topological_order()
            .map(|id| (id.clone(), graph.predecessors(id.as_str()).to_vec()))
            .collect(),
        root: root.to_string(),
        contributors,
        unreachable,
    }
}
