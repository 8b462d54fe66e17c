use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use dpm_contract::hash::stable_hash_string;
use dpm_contract::ViolationRow;
use dpm_core::{MonitorProvenance, SubsystemId, TriState};
use dpm_ship::Trajectory;
use serde::Serialize;
use tracing::info;

use super::{load_opts, print_json, write_json, ContractSource};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON trajectory with one sample per simulation step.
    #[arg(long)]
    pub trajectory: PathBuf,
    /// Threshold policy YAML; defaults apply when omitted.
    #[arg(long)]
    pub policy: Option<PathBuf>,
    /// Monitor options YAML.
    #[arg(long)]
    pub opts: Option<PathBuf>,
    /// Override the number of evaluation threads.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Data-defined contracts YAML (requires --graph).
    #[arg(long, requires = "graph")]
    pub contracts: Option<PathBuf>,
    /// Subsystem graph YAML for data-defined contracts.
    #[arg(long, requires = "contracts")]
    pub graph: Option<PathBuf>,
    /// Also monitor the estimation, allocation and actuator contracts.
    #[arg(long, conflicts_with = "contracts")]
    pub extended: bool,
    /// Output directory for `violations.csv` and `summary.json`.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    provenance: MonitorProvenance,
    root: SubsystemId,
    ticks: usize,
    replayed: usize,
    final_verdict: Option<TriState>,
    verdict_counts: BTreeMap<String, usize>,
    root_assumption_failures: usize,
    violations: usize,
    violations_by_subsystem: BTreeMap<SubsystemId, usize>,
    final_status_hashes: BTreeMap<SubsystemId, String>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let source = ContractSource {
        policy: args.policy.as_deref(),
        contracts: args.contracts.as_deref(),
        graph: args.graph.as_deref(),
        extended: args.extended,
    };
    let policy = source.policy()?;
    let mut opts = load_opts(args.opts.as_ref())?;
    if let Some(concurrency) = args.concurrency {
        opts.concurrency = concurrency;
    }
    let trajectory = Trajectory::load(&args.trajectory)?;
    let mut monitor = source.monitor(&policy, opts)?;
    let root = monitor.opts().root.clone();

    let mut ticks = 0usize;
    let mut replayed = 0usize;
    let mut final_verdict = None;
    let mut verdict_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut root_assumption_failures = 0usize;
    for snapshot in trajectory.snapshots() {
        let report = monitor.step(&snapshot)?;
        if report.replayed {
            replayed += 1;
            continue;
        }
        ticks += 1;
        *verdict_counts
            .entry(report.root_verdict.label().to_string())
            .or_default() += 1;
        if report
            .statuses
            .get(&root)
            .is_some_and(|status| status.assumptions_hold().is_violated())
        {
            root_assumption_failures += 1;
        }
        final_verdict = Some(report.root_verdict);
    }

    let rows = monitor.recorder().export_rows();
    write_violations(&args.out.join("violations.csv"), &rows)?;

    let mut violations_by_subsystem = BTreeMap::new();
    let mut final_status_hashes = BTreeMap::new();
    for id in monitor.graph().nodes() {
        violations_by_subsystem.insert(id.clone(), monitor.recorder().count_for(id.as_str()));
        if let Some(status) = monitor.latest_status(id.as_str()) {
            final_status_hashes.insert(id.clone(), status.stable_hash()?);
        }
    }
    let summary = RunSummary {
        provenance: MonitorProvenance::new(policy.stable_hash()?, stable_hash_string(&trajectory)?),
        root,
        ticks,
        replayed,
        final_verdict,
        verdict_counts,
        root_assumption_failures,
        violations: rows.len(),
        violations_by_subsystem,
        final_status_hashes,
    };
    write_json(args.out.join("summary.json"), &summary)?;
    info!(
        ticks,
        violations = rows.len(),
        out = %args.out.display(),
        "run exported"
    );
    print_json(&summary)
}

/// Always writes the header row, also for a run without violations.
fn write_violations(path: &Path, rows: &[ViolationRow]) -> Result<(), Box<dyn Error>> {
    let mut file = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    file.write_record(["time", "subsystem", "contract_id", "message"])?;
    for row in rows {
        file.serialize(row)?;
    }
    file.flush()?;
    Ok(())
}
