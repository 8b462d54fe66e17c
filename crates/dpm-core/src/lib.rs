#![deny(missing_docs)]
#![doc = "Core identifiers, tri-state results and errors for the dynamic-positioning contract monitor."]

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod provenance;
mod tristate;

pub use errors::{DpmError, ErrorInfo};
pub use provenance::{MonitorProvenance, SchemaVersion};
pub use tristate::{aggregate, TriState};

/// Identifier of a monitored subsystem (`observer`, `dp`, `ship`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubsystemId(String);

impl SubsystemId {
    /// Creates a subsystem identifier from its textual name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the textual name of the subsystem.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubsystemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SubsystemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for SubsystemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of one assumption (`A1`, `A2`, ...) or guarantee (`G1`, ...).
///
/// Unique within a single contract definition only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(String);

impl CheckId {
    /// Creates a check identifier from its textual label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the textual label of the check.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CheckId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CheckId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Section of a contract a check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    /// Precondition on data availability or validity.
    Assumption,
    /// Postcondition on achieved behaviour.
    Guarantee,
}
