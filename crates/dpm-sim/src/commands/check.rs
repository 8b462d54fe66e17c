use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use dpm_contract::ContractFile;
use dpm_monitor::Monitor;
use serde::Serialize;
use tracing::info;

use super::{load_graph, load_opts, print_json};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Contracts YAML to validate.
    #[arg(long)]
    pub contracts: PathBuf,
    /// Graph YAML; when given the full monitor configuration is validated.
    #[arg(long)]
    pub graph: Option<PathBuf>,
    /// Monitor options YAML used together with --graph.
    #[arg(long, requires = "graph")]
    pub opts: Option<PathBuf>,
    /// Write the validated contracts back out as normalized YAML.
    #[arg(long)]
    pub emit: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckSummary {
    contracts: usize,
    assumptions: usize,
    guarantees: usize,
    monitor_validated: bool,
    emitted: Option<String>,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let file = ContractFile::load(&args.contracts)?;
    let normalized = match &args.emit {
        Some(_) => Some(file.to_yaml()?),
        None => None,
    };
    let definitions = file.into_definitions()?;
    let summary = CheckSummary {
        contracts: definitions.len(),
        assumptions: definitions.iter().map(|d| d.assumptions().len()).sum(),
        guarantees: definitions.iter().map(|d| d.guarantees().len()).sum(),
        monitor_validated: args.graph.is_some(),
        emitted: args.emit.as_ref().map(|path| path.display().to_string()),
    };
    if let Some(graph) = &args.graph {
        let opts = load_opts(args.opts.as_ref())?;
        Monitor::new(definitions, load_graph(graph)?, opts)?;
    }
    if let (Some(path), Some(yaml)) = (&args.emit, normalized) {
        fs::write(path, yaml)?;
    }
    info!(contracts = summary.contracts, "contracts valid");
    print_json(&summary)
}
