use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use dpm_core::errors::{DpmError, ErrorInfo};
use dpm_core::{CheckId, CheckKind, SubsystemId};

use crate::predicate::Predicate;

/// One declared assumption or guarantee.
#[derive(Clone)]
pub struct CheckDecl {
    /// Identifier, unique within the contract.
    pub id: CheckId,
    /// Section the check belongs to.
    pub kind: CheckKind,
    /// Fixed message reported when the check is violated.
    pub message: String,
    /// Property evaluated for the check.
    pub predicate: Arc<dyn Predicate>,
    /// Checks that must be satisfied before the predicate may run.
    pub depends_on: Vec<CheckId>,
}

impl fmt::Debug for CheckDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckDecl")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("predicate", &self.predicate)
            .field("depends_on", &self.depends_on)
            .finish()
    }
}

/// Validated assume-guarantee contract of one subsystem.
///
/// Construction goes through [`ContractDefinitionBuilder::build`], so every
/// definition in circulation has unique ids and only backward dependencies.
#[derive(Debug, Clone)]
pub struct ContractDefinition {
    subsystem: SubsystemId,
    assumptions: Vec<CheckDecl>,
    guarantees: Vec<CheckDecl>,
}

impl ContractDefinition {
    /// Starts a definition for `subsystem`.
    pub fn builder(subsystem: impl Into<SubsystemId>) -> ContractDefinitionBuilder {
        ContractDefinitionBuilder {
            subsystem: subsystem.into(),
            assumptions: Vec::new(),
            guarantees: Vec::new(),
        }
    }

    /// Subsystem the contract belongs to.
    pub fn subsystem(&self) -> &SubsystemId {
        &self.subsystem
    }

    /// Assumptions in evaluation order.
    pub fn assumptions(&self) -> &[CheckDecl] {
        &self.assumptions
    }

    /// Guarantees in evaluation order.
    pub fn guarantees(&self) -> &[CheckDecl] {
        &self.guarantees
    }

    /// Every check in evaluation order: assumptions, then guarantees.
    pub fn checks(&self) -> impl Iterator<Item = &CheckDecl> {
        self.assumptions.iter().chain(self.guarantees.iter())
    }

    /// Upstream subsystems referenced by any predicate of the contract.
    pub fn upstream_refs(&self) -> BTreeSet<SubsystemId> {
        self.checks()
            .flat_map(|check| check.predicate.upstream_refs())
            .collect()
    }
}

/// Accumulates checks and validates them into a [`ContractDefinition`].
#[derive(Debug)]
pub struct ContractDefinitionBuilder {
    subsystem: SubsystemId,
    assumptions: Vec<CheckDecl>,
    guarantees: Vec<CheckDecl>,
}

impl ContractDefinitionBuilder {
    /// Declares an assumption; assumptions are evaluated unconditionally.
    pub fn assumption<P>(mut self, id: &str, message: impl Into<String>, predicate: P) -> Self
    where
        P: Predicate + 'static,
    {
        self.assumptions.push(CheckDecl {
            id: CheckId::new(id),
            kind: CheckKind::Assumption,
            message: message.into(),
            predicate: Arc::new(predicate),
            depends_on: Vec::new(),
        });
        self
    }

    /// Declares a guarantee that is only assessed once `depends_on` all hold.
    pub fn guarantee<P>(
        mut self,
        id: &str,
        message: impl Into<String>,
        predicate: P,
        depends_on: &[&str],
    ) -> Self
    where
        P: Predicate + 'static,
    {
        self.guarantees.push(CheckDecl {
            id: CheckId::new(id),
            kind: CheckKind::Guarantee,
            message: message.into(),
            predicate: Arc::new(predicate),
            depends_on: depends_on.iter().map(|dep| CheckId::new(*dep)).collect(),
        });
        self
    }

    /// Validates the declared checks.
    pub fn build(self) -> Result<ContractDefinition, DpmError> {
        if self.subsystem.as_str().trim().is_empty() {
            return Err(DpmError::contract(
                "empty-subsystem",
                "contract subsystem identifier must not be empty",
            ));
        }
        let all_ids: BTreeSet<&CheckId> = self
            .assumptions
            .iter()
            .chain(self.guarantees.iter())
            .map(|check| &check.id)
            .collect();
        let mut declared: BTreeSet<&CheckId> = BTreeSet::new();
        for check in self.assumptions.iter().chain(self.guarantees.iter()) {
            if check.id.as_str().trim().is_empty() {
                return Err(self.error(
                    "empty-check-id",
                    "check identifier must not be empty",
                    check,
                    None,
                ));
            }
            if declared.contains(&check.id) {
                return Err(self.error(
                    "duplicate-check",
                    "check identifier declared twice",
                    check,
                    None,
                ));
            }
            let (prefix, section) = match check.kind {
                CheckKind::Assumption => ('A', "assumption"),
                CheckKind::Guarantee => ('G', "guarantee"),
            };
            if !check.id.as_str().starts_with(prefix) {
                return Err(self.error(
                    "kind-mismatch",
                    format!("{section} identifiers must start with '{prefix}'"),
                    check,
                    None,
                ));
            }
            let referenced = check
                .depends_on
                .iter()
                .map(|dep| (dep.clone(), "dependency"))
                .chain(check.predicate.check_refs().into_iter().map(|r| (r, "reference")));
            for (target, role) in referenced {
                if target == check.id {
                    return Err(self.error(
                        "self-dependency",
                        format!("check lists itself as a {role}"),
                        check,
                        Some(&target),
                    ));
                }
                if !declared.contains(&target) {
                    let (code, message) = if all_ids.contains(&target) {
                        ("forward-dependency", format!("{role} on a later-declared check"))
                    } else {
                        ("unknown-dependency", format!("{role} on an undeclared check"))
                    };
                    return Err(self.error(code, message, check, Some(&target)));
                }
            }
            declared.insert(&check.id);
        }
        Ok(ContractDefinition {
            subsystem: self.subsystem,
            assumptions: self.assumptions,
            guarantees: self.guarantees,
        })
    }

    fn error(
        &self,
        code: &str,
        message: impl Into<String>,
        check: &CheckDecl,
        target: Option<&CheckId>,
    ) -> DpmError {
        let mut info = ErrorInfo::new(code, message)
            .with_context("subsystem", self.subsystem.as_str())
            .with_context("check", check.id.as_str());
        if let Some(target) = target {
            info = info.with_context("target", target.as_str());
        }
        DpmError::Contract(info)
    }
}
