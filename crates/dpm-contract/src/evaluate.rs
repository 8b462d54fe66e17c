use std::collections::BTreeMap;

use dpm_core::{CheckKind, SubsystemId, TriState};
use tracing::trace;

use crate::definition::{CheckDecl, ContractDefinition};
use crate::predicate::EvalContext;
use crate::snapshot::Snapshot;
use crate::status::{CheckResult, ContractStatus, ViolationRecord};

/// Status plus the violations produced while evaluating one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Complete check-to-result mapping for the tick.
    pub status: ContractStatus,
    /// One record per violated check, in evaluation order.
    pub violations: Vec<ViolationRecord>,
}

/// Evaluates `definition` against `snapshot`.
///
/// Assumptions run unconditionally in declaration order. A guarantee whose
/// dependencies are not all satisfied is `Indeterminate` and its predicate is
/// never invoked. The function is pure: calling it twice with the same inputs
/// yields identical evaluations.
pub fn evaluate_contract(
    definition: &ContractDefinition,
    snapshot: &Snapshot,
    upstream: &BTreeMap<SubsystemId, TriState>,
) -> Evaluation {
    let mut results: Vec<CheckResult> = Vec::with_capacity(
        definition.assumptions().len() + definition.guarantees().len(),
    );
    let mut violations = Vec::new();

    for check in definition.checks() {
        let result = match blocking_dependency(check, &results) {
            Some(blocker) => {
                trace!(
                    subsystem = %definition.subsystem(),
                    check = %check.id,
                    blocker = %blocker,
                    "guarantee not assessable"
                );
                TriState::Indeterminate
            }
            None => {
                let ctx = EvalContext {
                    snapshot,
                    upstream,
                    prior: &results,
                };
                let outcome = check.predicate.evaluate(&ctx);
                if !outcome.holds {
                    violations.push(ViolationRecord {
                        tick: snapshot.tick,
                        timestamp: snapshot.timestamp,
                        subsystem: definition.subsystem().clone(),
                        check: check.id.clone(),
                        message: outcome.message.unwrap_or_else(|| check.message.clone()),
                    });
                }
                TriState::from_bool(outcome.holds)
            }
        };
        results.push(CheckResult {
            id: check.id.clone(),
            kind: check.kind,
            result,
        });
    }

    Evaluation {
        status: ContractStatus {
            subsystem: definition.subsystem().clone(),
            tick: snapshot.tick,
            timestamp: snapshot.timestamp,
            results,
        },
        violations,
    }
}

fn blocking_dependency<'a>(check: &'a CheckDecl, results: &[CheckResult]) -> Option<&'a str> {
    if check.kind == CheckKind::Assumption {
        return None;
    }
    check
        .depends_on
        .iter()
        .find(|dep| {
            results
                .iter()
                .find(|r| &r.id == *dep)
                .map_or(true, |r| !r.result.is_satisfied())
        })
        .map(|dep| dep.as_str())
}
