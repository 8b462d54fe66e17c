//! Structured error types shared across the monitor crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`DpmError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (subsystem, check, tick, ...).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the contract monitor.
///
/// Check failures never surface here: a missing input or an unmet threshold is
/// a [`crate::TriState::Violated`] result, not an error. Only malformed
/// configuration, bad snapshot sequencing and I/O reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum DpmError {
    /// Malformed contract definitions (duplicate ids, forward references).
    #[error("contract error: {0}")]
    Contract(ErrorInfo),
    /// Malformed subsystem graphs (cycles, unknown nodes, missing definitions).
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Snapshot sequencing errors raised while stepping a run.
    #[error("input error: {0}")]
    Input(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem errors raised by loaders and exporters.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl DpmError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            DpmError::Contract(info)
            | DpmError::Graph(info)
            | DpmError::Input(info)
            | DpmError::Serde(info)
            | DpmError::Io(info) => info,
        }
    }

    /// Returns true for setup-time configuration failures that must abort a run.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DpmError::Contract(_) | DpmError::Graph(_))
    }

    /// Convenience constructor for contract configuration errors.
    pub fn contract(code: &str, message: impl Into<String>) -> Self {
        DpmError::Contract(ErrorInfo::new(code, message))
    }

    /// Convenience constructor for graph configuration errors.
    pub fn graph(code: &str, message: impl Into<String>) -> Self {
        DpmError::Graph(ErrorInfo::new(code, message))
    }
}
