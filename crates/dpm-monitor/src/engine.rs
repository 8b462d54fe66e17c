use std::collections::BTreeMap;

use dpm_contract::{
    evaluate_contract, ContractDefinition, ContractStatus, Evaluation, Snapshot, ViolationRecord,
};
use dpm_core::errors::{DpmError, ErrorInfo};
use dpm_core::{SubsystemId, TriState};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{root_verdict, upstream_verdicts};
use crate::config::MonitorOpts;
use crate::graph::SubsystemGraph;
use crate::history::StatusHistory;
use crate::recorder::ViolationRecorder;

/// Outcome of one monitored tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick of the evaluated snapshot.
    pub tick: u64,
    /// Timestamp of the evaluated snapshot.
    pub timestamp: f64,
    /// Status of every subsystem.
    pub statuses: BTreeMap<SubsystemId, ContractStatus>,
    /// Effective guarantee of every subsystem.
    pub effective: BTreeMap<SubsystemId, TriState>,
    /// Verdict of the configured root.
    pub root_verdict: TriState,
    /// Violations appended to the recorder by this call.
    pub new_violations: usize,
    /// True when the tick had already been evaluated and was served from history.
    pub replayed: bool,
}

#[derive(Debug, Clone, Copy)]
struct TickMark {
    timestamp: f64,
    root_verdict: TriState,
}

fn io_error(code: &str, err: impl ToString) -> DpmError {
    DpmError::Io(ErrorInfo::new(code, err.to_string()))
}

/// Tick-driven runtime monitor over a validated set of contracts.
pub struct Monitor {
    definitions: BTreeMap<SubsystemId, ContractDefinition>,
    graph: SubsystemGraph,
    opts: MonitorOpts,
    pool: rayon::ThreadPool,
    recorder: ViolationRecorder,
    histories: BTreeMap<SubsystemId, StatusHistory>,
    ticks: BTreeMap<u64, TickMark>,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("graph", &self.graph)
            .field("opts", &self.opts)
            .field("ticks", &self.ticks.len())
            .field("violations", &self.recorder.len())
            .finish_non_exhaustive()
    }
}

impl Monitor {
    /// Validates the configuration and prepares the worker pool.
    ///
    /// Refuses to start when a graph node lacks a definition (or vice versa),
    /// when an `upstream` predicate names a subsystem that is not a direct
    /// predecessor, or when the configured root is unknown.
    pub fn new(
        definitions: Vec<ContractDefinition>,
        graph: SubsystemGraph,
        opts: MonitorOpts,
    ) -> Result<Self, DpmError> {
        let mut by_id = BTreeMap::new();
        for definition in definitions {
            let id = definition.subsystem().clone();
            if !graph.contains(id.as_str()) {
                return Err(DpmError::Graph(
                    ErrorInfo::new(
                        "unknown-subsystem",
                        "contract has no node in the subsystem graph",
                    )
                    .with_context("subsystem", id.as_str()),
                ));
            }
            if by_id.insert(id.clone(), definition).is_some() {
                return Err(DpmError::Graph(
                    ErrorInfo::new("duplicate-definition", "subsystem has more than one contract")
                        .with_context("subsystem", id.as_str()),
                ));
            }
        }
        for node in graph.nodes() {
            let Some(definition) = by_id.get(node) else {
                return Err(DpmError::Graph(
                    ErrorInfo::new("missing-definition", "graph node has no contract")
                        .with_context("subsystem", node.as_str()),
                ));
            };
            let predecessors = graph.predecessors(node.as_str());
            for upstream in definition.upstream_refs() {
                if !predecessors.contains(&upstream) {
                    return Err(DpmError::Graph(
                        ErrorInfo::new(
                            "upstream-not-predecessor",
                            "upstream assumption names a subsystem without an edge into this one",
                        )
                        .with_context("subsystem", node.as_str())
                        .with_context("upstream", upstream.as_str())
                        .with_hint("add the edge to the subsystem graph"),
                    ));
                }
            }
        }
        if !graph.contains(opts.root.as_str()) {
            return Err(DpmError::Graph(
                ErrorInfo::new("unknown-root", "configured root is not a graph node")
                    .with_context("root", opts.root.as_str()),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.concurrency.max(1))
            .build()
            .map_err(|err| io_error("thread_pool", err))?;
        let histories = graph
            .nodes()
            .iter()
            .map(|id| (id.clone(), StatusHistory::new()))
            .collect();
        info!(
            subsystems = by_id.len(),
            levels = graph.topological_levels().len(),
            root = %opts.root,
            contributors = graph.contributors(opts.root.as_str()).len(),
            threads = opts.concurrency.max(1),
            "contract monitor configured"
        );
        Ok(Self {
            definitions: by_id,
            graph,
            opts,
            pool,
            recorder: ViolationRecorder::new(),
            histories,
            ticks: BTreeMap::new(),
        })
    }

    /// Evaluates every contract against `snapshot` and records the outcome.
    ///
    /// Levels run in topological order; the subsystems of one level are
    /// evaluated on the worker pool once every upstream verdict is final.
    /// Stepping an already evaluated tick replays the stored outcome without
    /// recording anything.
    pub fn step(&mut self, snapshot: &Snapshot) -> Result<TickReport, DpmError> {
        if !snapshot.timestamp.is_finite() {
            return Err(DpmError::Input(
                ErrorInfo::new("timestamp-invalid", "snapshot timestamp must be finite")
                    .with_context("tick", snapshot.tick.to_string())
                    .with_context("timestamp", snapshot.timestamp.to_string()),
            ));
        }
        if let Some(mark) = self.ticks.get(&snapshot.tick).copied() {
            return self.replay(snapshot, mark);
        }
        if let Some((&last_tick, last)) = self.ticks.iter().next_back() {
            if snapshot.tick < last_tick {
                return Err(DpmError::Input(
                    ErrorInfo::new(
                        "tick-order",
                        "tick precedes the latest evaluated tick but was never evaluated",
                    )
                    .with_context("tick", snapshot.tick.to_string())
                    .with_context("latest", last_tick.to_string()),
                ));
            }
            if snapshot.timestamp < last.timestamp {
                return Err(DpmError::Input(
                    ErrorInfo::new("timestamp-order", "timestamp decreases between ticks")
                        .with_context("tick", snapshot.tick.to_string())
                        .with_context("timestamp", snapshot.timestamp.to_string())
                        .with_context("latest", last.timestamp.to_string()),
                ));
            }
        }

        let mut statuses = BTreeMap::new();
        let mut effective = BTreeMap::new();
        let mut new_violations = 0usize;
        for level in self.graph.topological_levels() {
            let evaluations = self.evaluate_level(level, snapshot, &effective);
            for evaluation in evaluations {
                let Evaluation { status, violations } = evaluation;
                let id = status.subsystem.clone();
                new_violations += self.recorder.collect(violations);
                effective.insert(id.clone(), status.effective_guarantee());
                statuses.insert(id, status);
            }
        }
        let verdict = root_verdict(&self.graph, self.opts.root.as_str(), &statuses);

        for (id, status) in &statuses {
            if let Some(history) = self.histories.get_mut(id) {
                history.push(status.clone());
            }
        }
        self.ticks.insert(
            snapshot.tick,
            TickMark {
                timestamp: snapshot.timestamp,
                root_verdict: verdict,
            },
        );
        debug!(
            tick = snapshot.tick,
            time = snapshot.timestamp,
            root = %verdict,
            new_violations,
            "tick evaluated"
        );
        Ok(TickReport {
            tick: snapshot.tick,
            timestamp: snapshot.timestamp,
            statuses,
            effective,
            root_verdict: verdict,
            new_violations,
            replayed: false,
        })
    }

    fn evaluate_level(
        &self,
        level: &[SubsystemId],
        snapshot: &Snapshot,
        effective: &BTreeMap<SubsystemId, TriState>,
    ) -> Vec<Evaluation> {
        let graph = &self.graph;
        let definitions = &self.definitions;
        self.pool.install(|| {
            level
                .par_iter()
                .filter_map(|id| {
                    let definition = definitions.get(id)?;
                    let upstream = upstream_verdicts(graph, id.as_str(), effective);
                    Some(evaluate_contract(definition, snapshot, &upstream))
                })
                .collect()
        })
    }

    fn replay(&self, snapshot: &Snapshot, mark: TickMark) -> Result<TickReport, DpmError> {
        if snapshot.timestamp != mark.timestamp {
            return Err(DpmError::Input(
                ErrorInfo::new("replay-mismatch", "replayed tick carries a different timestamp")
                    .with_context("tick", snapshot.tick.to_string())
                    .with_context("timestamp", snapshot.timestamp.to_string())
                    .with_context("recorded", mark.timestamp.to_string()),
            ));
        }
        let statuses: BTreeMap<SubsystemId, ContractStatus> = self
            .histories
            .iter()
            .filter_map(|(id, history)| history.at(snapshot.tick).map(|s| (id.clone(), s.clone())))
            .collect();
        let effective = statuses
            .iter()
            .map(|(id, status)| (id.clone(), status.effective_guarantee()))
            .collect();
        debug!(tick = snapshot.tick, "tick replayed");
        Ok(TickReport {
            tick: snapshot.tick,
            timestamp: mark.timestamp,
            statuses,
            effective,
            root_verdict: mark.root_verdict,
            new_violations: 0,
            replayed: true,
        })
    }

    /// Most recent status of `subsystem`.
    pub fn latest_status(&self, subsystem: &str) -> Option<&ContractStatus> {
        self.histories.get(subsystem)?.latest()
    }

    /// Status of `subsystem` at `tick`.
    pub fn status_at(&self, subsystem: &str, tick: u64) -> Option<&ContractStatus> {
        self.histories.get(subsystem)?.at(tick)
    }

    /// Full status history of `subsystem`.
    pub fn history(&self, subsystem: &str) -> Option<&StatusHistory> {
        self.histories.get(subsystem)
    }

    /// Root verdict computed at `tick`.
    pub fn root_verdict_at(&self, tick: u64) -> Option<TriState> {
        self.ticks.get(&tick).map(|mark| mark.root_verdict)
    }

    /// Latest evaluated tick.
    pub fn last_tick(&self) -> Option<u64> {
        self.ticks.keys().next_back().copied()
    }

    /// The configured window of most recent violations.
    pub fn recent_violations(&self) -> Vec<ViolationRecord> {
        self.recorder.recent(self.opts.recent_window)
    }

    /// The violation recorder.
    pub fn recorder(&self) -> &ViolationRecorder {
        &self.recorder
    }

    /// The validated subsystem graph.
    pub fn graph(&self) -> &SubsystemGraph {
        &self.graph
    }

    /// Runtime options.
    pub fn opts(&self) -> &MonitorOpts {
        &self.opts
    }

    /// Definition monitored for `subsystem`.
    pub fn definition(&self, subsystem: &str) -> Option<&ContractDefinition> {
        self.definitions.get(subsystem)
    }
}
