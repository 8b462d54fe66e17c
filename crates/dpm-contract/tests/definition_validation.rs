mod common;

use dpm_contract::{ContractDefinition, PredicateSpec};

use common::fixed;

fn error_code(result: Result<ContractDefinition, dpm_core::DpmError>) -> String {
    let err = result.expect_err("definition should be rejected");
    assert!(err.is_configuration());
    err.info().code.clone()
}

#[test]
fn duplicate_ids_are_rejected() {
    let result = ContractDefinition::builder("observer")
        .assumption("A1", "first", fixed(true))
        .assumption("A1", "second", fixed(true))
        .build();
    assert_eq!(error_code(result), "duplicate-check");
}

#[test]
fn assumption_and_guarantee_ids_share_a_namespace() {
    let result = ContractDefinition::builder("observer")
        .assumption("A1", "first", fixed(true))
        .guarantee("A1", "clash", fixed(true), &[])
        .build();
    assert_eq!(error_code(result), "duplicate-check");
}

#[test]
fn check_ids_follow_their_section() {
    let result = ContractDefinition::builder("observer")
        .assumption("A1", "data", fixed(true))
        .assumption("G1", "declared as an assumption", fixed(true))
        .build();
    let err = result.expect_err("guarantee id in the assumption section");
    assert_eq!(err.info().code, "kind-mismatch");
    assert_eq!(err.info().context.get("check").map(String::as_str), Some("G1"));

    let result = ContractDefinition::builder("observer")
        .assumption("A1", "data", fixed(true))
        .guarantee("A2", "declared as a guarantee", fixed(true), &["A1"])
        .build();
    assert_eq!(error_code(result), "kind-mismatch");
}

#[test]
fn forward_guarantee_dependency_is_rejected() {
    let result = ContractDefinition::builder("reference")
        .assumption("A1", "setpoints missing", fixed(true))
        .guarantee("G1", "trajectory invalid", fixed(true), &["G2"])
        .guarantee("G2", "not smoothed", fixed(true), &["A1"])
        .build();
    let err = result.expect_err("forward reference");
    assert_eq!(err.info().code, "forward-dependency");
    assert_eq!(err.info().context.get("check").map(String::as_str), Some("G1"));
    assert_eq!(err.info().context.get("target").map(String::as_str), Some("G2"));
}

#[test]
fn unknown_dependency_is_rejected() {
    let result = ContractDefinition::builder("dp")
        .assumption("A1", "missing", fixed(true))
        .guarantee("G1", "no control action", fixed(true), &["A9"])
        .build();
    assert_eq!(error_code(result), "unknown-dependency");
}

#[test]
fn self_dependency_is_rejected() {
    let result = ContractDefinition::builder("dp")
        .guarantee("G1", "loop", fixed(true), &["G1"])
        .build();
    assert_eq!(error_code(result), "self-dependency");
}

#[test]
fn checks_hold_must_reference_earlier_checks() {
    let result = ContractDefinition::builder("ship")
        .assumption("A1", "rolls up a guarantee", PredicateSpec::checks_hold(["G1"]))
        .guarantee("G1", "tracking", fixed(true), &[])
        .build();
    assert_eq!(error_code(result), "forward-dependency");
}

#[test]
fn nested_references_are_validated() {
    let result = ContractDefinition::builder("ship")
        .guarantee(
            "G2",
            "assumptions",
            PredicateSpec::All {
                of: vec![PredicateSpec::checks_hold(["A7"])],
            },
            &[],
        )
        .build();
    assert_eq!(error_code(result), "unknown-dependency");
}

#[test]
fn empty_subsystem_is_rejected() {
    let result = ContractDefinition::builder("  ")
        .assumption("A1", "x", fixed(true))
        .build();
    assert_eq!(error_code(result), "empty-subsystem");
}

#[test]
fn valid_definition_preserves_declaration_order() {
    let definition = ContractDefinition::builder("ship")
        .guarantee("G1", "tracking", fixed(true), &["A1"])
        .assumption("A1", "data", fixed(true))
        .assumption("A2", "limits", fixed(true))
        .guarantee("G2", "assumptions hold", PredicateSpec::checks_hold(["A1", "A2"]), &[])
        .build()
        .expect("valid definition");
    let order: Vec<&str> = definition.checks().map(|check| check.id.as_str()).collect();
    assert_eq!(order, vec!["A1", "A2", "G1", "G2"]);
}

#[test]
fn upstream_references_are_collected() {
    let definition = ContractDefinition::builder("ship")
        .assumption(
            "A3",
            "Subsystem outputs are abnormal.",
            PredicateSpec::upstream(["observer", "dp"]),
        )
        .assumption("A4", "State estimation is inaccurate.", PredicateSpec::upstream(["observer"]))
        .build()
        .expect("valid definition");
    let refs: Vec<String> = definition
        .upstream_refs()
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(refs, vec!["dp".to_string(), "observer".to_string()]);
}
