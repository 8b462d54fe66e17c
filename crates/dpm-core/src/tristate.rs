use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single check or of an aggregate of checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriState {
    /// The check was assessed and holds.
    Satisfied,
    /// The check was assessed and does not hold.
    Violated,
    /// The check could not be assessed because a dependency was not satisfied.
    Indeterminate,
}

impl TriState {
    /// Maps a boolean predicate result onto the tri-state domain.
    pub fn from_bool(holds: bool) -> Self {
        if holds {
            TriState::Satisfied
        } else {
            TriState::Violated
        }
    }

    /// Returns true only for [`TriState::Satisfied`].
    pub fn is_satisfied(self) -> bool {
        self == TriState::Satisfied
    }

    /// Returns true only for [`TriState::Violated`].
    pub fn is_violated(self) -> bool {
        self == TriState::Violated
    }

    /// Short lowercase label used in logs and tables.
    pub fn label(self) -> &'static str {
        match self {
            TriState::Satisfied => "satisfied",
            TriState::Violated => "violated",
            TriState::Indeterminate => "indeterminate",
        }
    }

    /// Combines two results: violated dominates indeterminate, which dominates satisfied.
    pub fn combine(self, other: TriState) -> TriState {
        match (self, other) {
            (TriState::Violated, _) | (_, TriState::Violated) => TriState::Violated,
            (TriState::Indeterminate, _) | (_, TriState::Indeterminate) => {
                TriState::Indeterminate
            }
            _ => TriState::Satisfied,
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregates a set of results. The empty set aggregates to `Satisfied`.
pub fn aggregate<I>(results: I) -> TriState
where
    I: IntoIterator<Item = TriState>,
{
    results
        .into_iter()
        .fold(TriState::Satisfied, TriState::combine)
}
