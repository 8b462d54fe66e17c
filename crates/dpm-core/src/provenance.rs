//! Provenance and schema descriptors attached to exported run artefacts.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MonitorProvenance {
    /// Schema of the summary payload.
    pub schema: SchemaVersion,
    /// Stable hash of the threshold policy applied during the run.
    pub policy_hash: String,
    /// Stable hash of the input trajectory.
    pub input_hash: String,
    /// ISO-8601 timestamp recording when the artefact was generated.
    pub created_at: String,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}

impl MonitorProvenance {
    /// Creates provenance stamped with the current UTC time.
    pub fn new(policy_hash: impl Into<String>, input_hash: impl Into<String>) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            "dpm-core".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self {
            schema: SchemaVersion::default(),
            policy_hash: policy_hash.into(),
            input_hash: input_hash.into(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_versions,
        }
    }
}
