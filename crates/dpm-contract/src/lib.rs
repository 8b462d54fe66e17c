#![deny(missing_docs)]
#![doc = "Assume-guarantee contract definitions and the per-tick contract evaluator."]

/// Contract definitions and their setup-time validation.
pub mod definition;
/// The contract evaluator.
pub mod evaluate;
/// Canonical hashing helpers.
pub mod hash;
/// YAML contract files.
pub mod loader;
/// Deviation metrics shared by threshold predicates.
pub mod numeric;
/// Predicate trait and the declarative predicate family.
pub mod predicate;
/// Canonical JSON and YAML helpers.
pub mod serde;
/// Per-tick input snapshots.
pub mod snapshot;
/// Contract statuses and violation records.
pub mod status;

pub use definition::{CheckDecl, ContractDefinition, ContractDefinitionBuilder};
pub use evaluate::{evaluate_contract, Evaluation};
pub use loader::{contract_specs_from_yaml, load_contract_specs, CheckSpec, ContractFile, ContractSpec};
pub use predicate::{CheckOutcome, EvalContext, FnPredicate, Predicate, PredicateSpec};
pub use snapshot::{Snapshot, Value};
pub use status::{CheckResult, ContractStatus, ViolationRecord, ViolationRow};
