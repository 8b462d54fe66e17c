pub mod check;
pub mod graph;
pub mod run;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use dpm_contract::serde::{from_yaml_slice, to_canonical_json_bytes};
use dpm_contract::{load_contract_specs, ContractDefinition};
use dpm_core::errors::{DpmError, ErrorInfo};
use dpm_monitor::{GraphSpec, Monitor, MonitorOpts, SubsystemGraph};
use dpm_ship::{extended_catalog, extended_graph, ship_catalog, ship_graph, ShipPolicy};

/// Where the monitored contracts come from.
pub struct ContractSource<'a> {
    pub policy: Option<&'a Path>,
    pub contracts: Option<&'a Path>,
    pub graph: Option<&'a Path>,
    pub extended: bool,
}

impl ContractSource<'_> {
    pub fn policy(&self) -> Result<ShipPolicy, DpmError> {
        match self.policy {
            Some(path) => ShipPolicy::load(path),
            None => Ok(ShipPolicy::default()),
        }
    }

    /// Contracts and graph: a YAML pair when given, the ship catalog otherwise.
    pub fn resolve(
        &self,
        policy: &ShipPolicy,
    ) -> Result<(Vec<ContractDefinition>, SubsystemGraph), DpmError> {
        match (self.contracts, self.graph) {
            (Some(contracts), Some(graph)) => Ok((load_contract_specs(contracts)?, load_graph(graph)?)),
            (Some(_), None) | (None, Some(_)) => Err(DpmError::Graph(
                ErrorInfo::new(
                    "incomplete-source",
                    "data-defined contracts need both a contracts file and a graph file",
                )
                .with_hint("pass --contracts together with --graph"),
            )),
            (None, None) if self.extended => Ok((extended_catalog(policy)?, extended_graph()?)),
            (None, None) => Ok((ship_catalog(policy)?, ship_graph()?)),
        }
    }

    pub fn monitor(&self, policy: &ShipPolicy, opts: MonitorOpts) -> Result<Monitor, DpmError> {
        let (definitions, graph) = self.resolve(policy)?;
        Monitor::new(definitions, graph, opts)
    }
}

pub fn load_graph(path: &Path) -> Result<SubsystemGraph, DpmError> {
    let bytes = fs::read(path).map_err(|err| {
        DpmError::Io(
            ErrorInfo::new("graph_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let spec: GraphSpec = from_yaml_slice(&bytes)?;
    SubsystemGraph::from_spec(spec)
}

pub fn load_opts(path: Option<&PathBuf>) -> Result<MonitorOpts, DpmError> {
    match path {
        Some(path) => MonitorOpts::load(path),
        None => Ok(MonitorOpts::default()),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    let bytes = to_canonical_json_bytes(value)?;
    println!("{}", String::from_utf8(bytes)?);
    Ok(())
}

pub fn write_json<T: serde::Serialize>(path: PathBuf, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
