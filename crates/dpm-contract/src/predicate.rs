use std::collections::BTreeMap;
use std::fmt;

use dpm_core::{CheckId, SubsystemId, TriState};
use serde::{Deserialize, Serialize};

use crate::numeric::{deviation_norm, euclidean_norm, gradient, max_abs_deviation, within};
use crate::snapshot::Snapshot;
use crate::status::CheckResult;

/// Boolean result of a predicate plus an optional violation message.
///
/// A `None` message means the check's declared message is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Whether the checked property holds.
    pub holds: bool,
    /// Message overriding the declared violation text.
    pub message: Option<String>,
}

impl CheckOutcome {
    /// Outcome for a property that holds.
    pub fn pass() -> Self {
        Self {
            holds: true,
            message: None,
        }
    }

    /// Outcome for a violated property reported with the declared message.
    pub fn fail() -> Self {
        Self {
            holds: false,
            message: None,
        }
    }

    /// Outcome for a violated property with a specific message.
    pub fn fail_with(message: impl Into<String>) -> Self {
        Self {
            holds: false,
            message: Some(message.into()),
        }
    }

    /// Maps a boolean onto pass or declared-message failure.
    pub fn from_bool(holds: bool) -> Self {
        if holds {
            Self::pass()
        } else {
            Self::fail()
        }
    }

    fn unavailable(field: &str) -> Self {
        Self::fail_with(format!("{field} unavailable"))
    }
}

/// Everything a predicate may read while evaluating one check.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// Snapshot of the current tick.
    pub snapshot: &'a Snapshot,
    /// Effective guarantees of upstream subsystems, resolved for this tick.
    pub upstream: &'a BTreeMap<SubsystemId, TriState>,
    /// Results of the checks already evaluated in this contract.
    pub prior: &'a [CheckResult],
}

impl<'a> EvalContext<'a> {
    /// Returns the result of an earlier check of the same contract.
    pub fn prior_result(&self, id: &CheckId) -> Option<TriState> {
        self.prior
            .iter()
            .find(|check| &check.id == id)
            .map(|check| check.result)
    }

    /// Returns the effective guarantee of an upstream subsystem.
    pub fn upstream_verdict(&self, id: &SubsystemId) -> Option<TriState> {
        self.upstream.get(id).copied()
    }
}

/// Pure, side-effect free property over a tick's inputs.
pub trait Predicate: Send + Sync + fmt::Debug {
    /// Evaluates the property.
    fn evaluate(&self, ctx: &EvalContext<'_>) -> CheckOutcome;

    /// Checks of the same contract whose results this predicate reads.
    fn check_refs(&self) -> Vec<CheckId> {
        Vec::new()
    }

    /// Upstream subsystems whose effective guarantees this predicate reads.
    fn upstream_refs(&self) -> Vec<SubsystemId> {
        Vec::new()
    }
}

/// Adapts a closure into a [`Predicate`].
pub struct FnPredicate<F> {
    label: String,
    func: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&EvalContext<'_>) -> CheckOutcome + Send + Sync,
{
    /// Wraps `func` under a label used in debug output.
    pub fn new(label: impl Into<String>, func: F) -> Self {
        Self {
            label: label.into(),
            func,
        }
    }
}

impl<F> fmt::Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&EvalContext<'_>) -> CheckOutcome + Send + Sync,
{
    fn evaluate(&self, ctx: &EvalContext<'_>) -> CheckOutcome {
        (self.func)(ctx)
    }
}

/// Declarative predicate family, loadable from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PredicateSpec {
    /// Every listed field is present and finite.
    Available {
        /// Required field names.
        fields: Vec<String>,
    },
    /// A boolean field is present and true.
    Flag {
        /// Flag field name.
        field: String,
    },
    /// Euclidean norm of `actual - expected` is at most `threshold`.
    Deviation {
        /// Measured vector.
        actual: String,
        /// Reference vector.
        expected: String,
        /// Inclusive upper bound.
        threshold: f64,
    },
    /// Every component of `|actual - expected|` is at most `threshold`.
    ComponentDeviation {
        /// Measured vector.
        actual: String,
        /// Reference vector.
        expected: String,
        /// Inclusive upper bound per component.
        threshold: f64,
    },
    /// Euclidean norm of a field is at most `threshold`.
    Magnitude {
        /// Field name.
        field: String,
        /// Inclusive upper bound.
        threshold: f64,
    },
    /// Every `|x_i|` is at most `limits[i]`.
    ComponentLimits {
        /// Field name.
        field: String,
        /// Per-component inclusive bounds.
        limits: Vec<f64>,
    },
    /// Every component has magnitude of at least `min`; an empty vector is unavailable.
    Active {
        /// Field name.
        field: String,
        /// Minimum magnitude for a component to count as active.
        min: f64,
    },
    /// Every component of the discrete gradient is at most `threshold` in magnitude.
    Smoothness {
        /// Field name.
        field: String,
        /// Inclusive upper bound on the gradient magnitude.
        threshold: f64,
    },
    /// Every listed upstream subsystem's effective guarantee is satisfied.
    Upstream {
        /// Upstream subsystem names.
        subsystems: Vec<SubsystemId>,
    },
    /// Every listed earlier check of this contract is satisfied.
    ChecksHold {
        /// Earlier check identifiers.
        checks: Vec<CheckId>,
    },
    /// Conjunction of nested predicates.
    All {
        /// Nested predicates, evaluated in order.
        of: Vec<PredicateSpec>,
    },
}

impl PredicateSpec {
    /// Shorthand for [`PredicateSpec::Available`].
    pub fn available<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PredicateSpec::Available {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand for [`PredicateSpec::Flag`].
    pub fn flag(field: impl Into<String>) -> Self {
        PredicateSpec::Flag {
            field: field.into(),
        }
    }

    /// Shorthand for [`PredicateSpec::Deviation`].
    pub fn deviation(actual: impl Into<String>, expected: impl Into<String>, threshold: f64) -> Self {
        PredicateSpec::Deviation {
            actual: actual.into(),
            expected: expected.into(),
            threshold,
        }
    }

    /// Shorthand for [`PredicateSpec::ComponentDeviation`].
    pub fn component_deviation(
        actual: impl Into<String>,
        expected: impl Into<String>,
        threshold: f64,
    ) -> Self {
        PredicateSpec::ComponentDeviation {
            actual: actual.into(),
            expected: expected.into(),
            threshold,
        }
    }

    /// Shorthand for [`PredicateSpec::Magnitude`].
    pub fn magnitude(field: impl Into<String>, threshold: f64) -> Self {
        PredicateSpec::Magnitude {
            field: field.into(),
            threshold,
        }
    }

    /// Shorthand for [`PredicateSpec::Upstream`].
    pub fn upstream<I, S>(subsystems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubsystemId>,
    {
        PredicateSpec::Upstream {
            subsystems: subsystems.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand for [`PredicateSpec::ChecksHold`].
    pub fn checks_hold<I, S>(checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CheckId>,
    {
        PredicateSpec::ChecksHold {
            checks: checks.into_iter().map(Into::into).collect(),
        }
    }
}

fn paired<'s>(
    snapshot: &'s Snapshot,
    actual: &str,
    expected: &str,
) -> Result<(&'s [f64], &'s [f64]), CheckOutcome> {
    let a = snapshot
        .numeric(actual)
        .ok_or_else(|| CheckOutcome::unavailable(actual))?;
    let e = snapshot
        .numeric(expected)
        .ok_or_else(|| CheckOutcome::unavailable(expected))?;
    Ok((a, e))
}

fn shape_mismatch(actual: &str, expected: &str) -> CheckOutcome {
    CheckOutcome::fail_with(format!("{actual} and {expected} have different dimensions"))
}

impl Predicate for PredicateSpec {
    fn evaluate(&self, ctx: &EvalContext<'_>) -> CheckOutcome {
        let snapshot = ctx.snapshot;
        match self {
            PredicateSpec::Available { fields } => {
                CheckOutcome::from_bool(fields.iter().all(|field| snapshot.available(field)))
            }
            PredicateSpec::Flag { field } => match snapshot.flag(field) {
                Some(value) => CheckOutcome::from_bool(value),
                None => CheckOutcome::unavailable(field),
            },
            PredicateSpec::Deviation {
                actual,
                expected,
                threshold,
            } => match paired(snapshot, actual, expected) {
                Ok((a, e)) => match deviation_norm(a, e) {
                    Some(dev) => CheckOutcome::from_bool(within(dev, *threshold)),
                    None => shape_mismatch(actual, expected),
                },
                Err(outcome) => outcome,
            },
            PredicateSpec::ComponentDeviation {
                actual,
                expected,
                threshold,
            } => match paired(snapshot, actual, expected) {
                Ok((a, e)) => match max_abs_deviation(a, e) {
                    Some(dev) => CheckOutcome::from_bool(within(dev, *threshold)),
                    None => shape_mismatch(actual, expected),
                },
                Err(outcome) => outcome,
            },
            PredicateSpec::Magnitude { field, threshold } => match snapshot.numeric(field) {
                Some(values) => CheckOutcome::from_bool(within(euclidean_norm(values), *threshold)),
                None => CheckOutcome::unavailable(field),
            },
            PredicateSpec::ComponentLimits { field, limits } => match snapshot.numeric(field) {
                Some(values) if values.len() == limits.len() => CheckOutcome::from_bool(
                    values
                        .iter()
                        .zip(limits)
                        .all(|(value, limit)| within(value.abs(), *limit)),
                ),
                Some(values) => CheckOutcome::fail_with(format!(
                    "{field} has {} components but {} limits are configured",
                    values.len(),
                    limits.len()
                )),
                None => CheckOutcome::unavailable(field),
            },
            PredicateSpec::Active { field, min } => match snapshot.numeric(field) {
                Some([]) | None => CheckOutcome::unavailable(field),
                Some(values) => {
                    CheckOutcome::from_bool(values.iter().all(|value| value.abs() >= *min))
                }
            },
            PredicateSpec::Smoothness { field, threshold } => match snapshot.numeric(field) {
                Some(values) => CheckOutcome::from_bool(
                    gradient(values)
                        .iter()
                        .all(|slope| within(slope.abs(), *threshold)),
                ),
                None => CheckOutcome::unavailable(field),
            },
            PredicateSpec::Upstream { subsystems } => {
                for subsystem in subsystems {
                    match ctx.upstream_verdict(subsystem) {
                        Some(TriState::Satisfied) => {}
                        Some(_) => return CheckOutcome::fail(),
                        None => {
                            return CheckOutcome::fail_with(format!(
                                "upstream {subsystem} verdict unavailable"
                            ))
                        }
                    }
                }
                CheckOutcome::pass()
            }
            PredicateSpec::ChecksHold { checks } => CheckOutcome::from_bool(
                checks
                    .iter()
                    .all(|id| ctx.prior_result(id) == Some(TriState::Satisfied)),
            ),
            PredicateSpec::All { of } => {
                for nested in of {
                    let outcome = nested.evaluate(ctx);
                    if !outcome.holds {
                        return outcome;
                    }
                }
                CheckOutcome::pass()
            }
        }
    }

    fn check_refs(&self) -> Vec<CheckId> {
        match self {
            PredicateSpec::ChecksHold { checks } => checks.clone(),
            PredicateSpec::All { of } => of.iter().flat_map(Predicate::check_refs).collect(),
            _ => Vec::new(),
        }
    }

    fn upstream_refs(&self) -> Vec<SubsystemId> {
        match self {
            PredicateSpec::Upstream { subsystems } => subsystems.clone(),
            PredicateSpec::All { of } => of.iter().flat_map(Predicate::upstream_refs).collect(),
            _ => Vec::new(),
        }
    }
}
