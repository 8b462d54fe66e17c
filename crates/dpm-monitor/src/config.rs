use std::fs;
use std::path::Path;

use dpm_contract::serde::from_yaml_slice;
use dpm_core::errors::{DpmError, ErrorInfo};
use dpm_core::SubsystemId;
use serde::{Deserialize, Serialize};

/// Runtime options of a [`crate::Monitor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorOpts {
    /// Worker threads used to evaluate one topological level.
    #[serde(default = "MonitorOpts::default_concurrency")]
    pub concurrency: usize,
    /// Subsystem whose verdict summarises the tick.
    #[serde(default = "MonitorOpts::default_root")]
    pub root: SubsystemId,
    /// Number of violations served by [`crate::Monitor::recent_violations`].
    #[serde(default = "MonitorOpts::default_recent_window")]
    pub recent_window: usize,
}

impl Default for MonitorOpts {
    fn default() -> Self {
        Self {
            concurrency: Self::default_concurrency(),
            root: Self::default_root(),
            recent_window: Self::default_recent_window(),
        }
    }
}

impl MonitorOpts {
    const fn default_concurrency() -> usize {
        1
    }

    fn default_root() -> SubsystemId {
        SubsystemId::new("ship")
    }

    const fn default_recent_window() -> usize {
        10
    }

    /// Parses options from YAML; omitted fields take their defaults.
    pub fn from_yaml(data: &[u8]) -> Result<Self, DpmError> {
        from_yaml_slice(data)
    }

    /// Loads options from a YAML file.
    pub fn load(path: &Path) -> Result<Self, DpmError> {
        let bytes = fs::read(path).map_err(|err| {
            DpmError::Io(
                ErrorInfo::new("monitor_opts_read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml(&bytes)
    }
}
