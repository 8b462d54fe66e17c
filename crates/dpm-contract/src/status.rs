use dpm_core::errors::DpmError;
use dpm_core::{aggregate, CheckId, CheckKind, SubsystemId, TriState};
use serde::{Deserialize, Serialize};

use crate::hash::stable_hash_string;

/// Result of one check within a [`ContractStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Identifier of the check.
    pub id: CheckId,
    /// Whether the check is an assumption or a guarantee.
    pub kind: CheckKind,
    /// Tri-state outcome for the tick.
    pub result: TriState,
}

/// Immutable outcome of evaluating one contract against one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractStatus {
    /// Subsystem the contract belongs to.
    pub subsystem: SubsystemId,
    /// Tick of the evaluated snapshot.
    pub tick: u64,
    /// Timestamp of the evaluated snapshot.
    pub timestamp: f64,
    /// Results in declaration order: assumptions first, then guarantees.
    pub results: Vec<CheckResult>,
}

impl ContractStatus {
    /// Returns the result recorded for `id`, if the contract declares it.
    pub fn result(&self, id: &str) -> Option<TriState> {
        self.results
            .iter()
            .find(|check| check.id.as_str() == id)
            .map(|check| check.result)
    }

    /// Iterates over guarantee results only.
    pub fn guarantees(&self) -> impl Iterator<Item = &CheckResult> {
        self.results
            .iter()
            .filter(|check| check.kind == CheckKind::Guarantee)
    }

    /// Iterates over assumption results only.
    pub fn assumptions(&self) -> impl Iterator<Item = &CheckResult> {
        self.results
            .iter()
            .filter(|check| check.kind == CheckKind::Assumption)
    }

    /// Aggregation of every guarantee result of the subsystem.
    pub fn effective_guarantee(&self) -> TriState {
        aggregate(self.guarantees().map(|check| check.result))
    }

    /// Aggregation of every assumption result of the subsystem.
    pub fn assumptions_hold(&self) -> TriState {
        aggregate(self.assumptions().map(|check| check.result))
    }

    /// Number of checks that evaluated to `Violated`.
    pub fn violated_count(&self) -> usize {
        self.results
            .iter()
            .filter(|check| check.result.is_violated())
            .count()
    }

    /// Content hash of the status, stable across runs and platforms.
    pub fn stable_hash(&self) -> Result<String, DpmError> {
        stable_hash_string(self)
    }
}

/// One violated check at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Tick at which the violation occurred.
    pub tick: u64,
    /// Simulation time at which the violation occurred.
    pub timestamp: f64,
    /// Subsystem owning the violated check.
    pub subsystem: SubsystemId,
    /// Identifier of the violated check.
    pub check: CheckId,
    /// Human readable description.
    pub message: String,
}

impl ViolationRecord {
    /// Projects the record onto the `(time, subsystem, check id, message)` tuple.
    pub fn row(&self) -> ViolationRow {
        ViolationRow {
            time: round_time(self.timestamp),
            subsystem: self.subsystem.to_string(),
            contract_id: self.check.to_string(),
            message: self.message.clone(),
        }
    }
}

/// Tabular shape handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRow {
    /// Simulation time rounded to two decimals.
    pub time: f64,
    /// Subsystem name.
    pub subsystem: String,
    /// Check identifier.
    pub contract_id: String,
    /// Violation message.
    pub message: String,
}

fn round_time(time: f64) -> f64 {
    (time * 100.0).round() / 100.0
}
