use std::fs;
use std::path::Path;

use dpm_core::errors::{DpmError, ErrorInfo};
use dpm_core::SubsystemId;
use serde::{Deserialize, Serialize};

use crate::definition::ContractDefinition;
use crate::predicate::PredicateSpec;
use crate::serde::{from_yaml_slice, to_yaml_string};

/// Serialized form of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Check identifier.
    pub id: String,
    /// Fixed violation message.
    pub message: String,
    /// Declarative predicate.
    pub predicate: PredicateSpec,
    /// Dependencies; only meaningful for guarantees.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// Serialized form of a whole contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    /// Subsystem the contract belongs to.
    pub subsystem: SubsystemId,
    /// Assumptions in evaluation order.
    #[serde(default)]
    pub assumptions: Vec<CheckSpec>,
    /// Guarantees in evaluation order.
    #[serde(default)]
    pub guarantees: Vec<CheckSpec>,
}

impl ContractSpec {
    /// Builds a validated definition through [`ContractDefinition::builder`].
    pub fn into_definition(self) -> Result<ContractDefinition, DpmError> {
        let mut builder = ContractDefinition::builder(self.subsystem.clone());
        for check in self.assumptions {
            if !check.depends_on.is_empty() {
                return Err(DpmError::Contract(
                    ErrorInfo::new(
                        "assumption-dependency",
                        "assumptions are evaluated unconditionally and cannot declare dependencies",
                    )
                    .with_context("subsystem", self.subsystem.as_str())
                    .with_context("check", check.id),
                ));
            }
            builder = builder.assumption(&check.id, check.message, check.predicate);
        }
        for check in self.guarantees {
            let deps: Vec<&str> = check.depends_on.iter().map(String::as_str).collect();
            builder = builder.guarantee(&check.id, check.message, check.predicate, &deps);
        }
        builder.build()
    }
}

/// File layout accepted by [`load_contract_specs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContractFile {
    /// Contracts in declaration order.
    #[serde(default)]
    pub contracts: Vec<ContractSpec>,
}

impl ContractFile {
    /// Reads a contract file without validating its contracts.
    pub fn load(path: &Path) -> Result<Self, DpmError> {
        let bytes = fs::read(path).map_err(|err| {
            DpmError::Io(
                ErrorInfo::new("contract_read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_yaml_slice(&bytes)
    }

    /// Renders the file in normalized form: defaults filled in, empty
    /// dependency lists omitted.
    pub fn to_yaml(&self) -> Result<String, DpmError> {
        to_yaml_string(self)
    }

    /// Validates every contract through [`ContractSpec::into_definition`].
    pub fn into_definitions(self) -> Result<Vec<ContractDefinition>, DpmError> {
        self.contracts
            .into_iter()
            .map(ContractSpec::into_definition)
            .collect()
    }
}

/// Parses contract specs from YAML bytes.
pub fn contract_specs_from_yaml(data: &[u8]) -> Result<Vec<ContractSpec>, DpmError> {
    let file: ContractFile = from_yaml_slice(data)?;
    Ok(file.contracts)
}

/// Loads and validates every contract declared in a YAML file.
pub fn load_contract_specs(path: &Path) -> Result<Vec<ContractDefinition>, DpmError> {
    ContractFile::load(path)?.into_definitions()
}
