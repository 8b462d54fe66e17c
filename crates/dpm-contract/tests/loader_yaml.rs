use std::collections::BTreeMap;
use std::fs;

use dpm_contract::{
    contract_specs_from_yaml, evaluate_contract, load_contract_specs, ContractFile, PredicateSpec,
    Snapshot,
};
use dpm_core::TriState;

const REFERENCE_YAML: &str = r#"
contracts:
  - subsystem: reference
    assumptions:
      - id: A1
        message: Setpoints eta_sp or nu_sp are missing.
        predicate:
          kind: available
          fields: [eta_sp, nu_sp]
    guarantees:
      - id: G1
        message: Trajectory setpoints are not valid or contain anomalies.
        predicate:
          kind: flag
          field: setpoints_valid
        depends_on: [A1]
      - id: G2
        message: Setpoints are not smoothed properly.
        predicate:
          kind: smoothness
          field: eta_sp
          threshold: 10.0
        depends_on: [A1]
"#;

#[test]
fn yaml_contracts_parse_into_predicates() {
    let specs = contract_specs_from_yaml(REFERENCE_YAML.as_bytes()).expect("parse");
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].guarantees[1].predicate, PredicateSpec::Smoothness {
        field: "eta_sp".to_string(),
        threshold: 10.0,
    });
}

#[test]
fn yaml_contracts_load_and_evaluate() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("contracts.yaml");
    fs::write(&path, REFERENCE_YAML).expect("write");
    let definitions = load_contract_specs(&path).expect("load");
    assert_eq!(definitions[0].subsystem().as_str(), "reference");

    let snapshot = Snapshot::new(0, 0.0)
        .with_vector("eta_sp", vec![0.0, 12.0, 0.0])
        .with_vector("nu_sp", vec![0.0, 0.0, 0.0])
        .with_flag("setpoints_valid", true);
    let evaluation = evaluate_contract(&definitions[0], &snapshot, &BTreeMap::new());
    assert_eq!(evaluation.status.result("G1"), Some(TriState::Satisfied));
    assert_eq!(evaluation.status.result("G2"), Some(TriState::Violated));
}

#[test]
fn yaml_forward_reference_is_a_configuration_error() {
    let yaml = r#"
contracts:
  - subsystem: dp
    guarantees:
      - id: G1
        message: x
        predicate: { kind: flag, field: ok }
        depends_on: [G2]
      - id: G2
        message: y
        predicate: { kind: flag, field: ok }
"#;
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, yaml).expect("write");
    let err = load_contract_specs(&path).expect_err("must reject");
    assert!(err.is_configuration());
    assert_eq!(err.info().code, "forward-dependency");
}

#[test]
fn yaml_assumption_dependencies_are_rejected() {
    let yaml = r#"
contracts:
  - subsystem: dp
    assumptions:
      - id: A1
        message: x
        predicate: { kind: flag, field: ok }
        depends_on: [A0]
"#;
    let specs = contract_specs_from_yaml(yaml.as_bytes()).expect("parse");
    let err = specs
        .into_iter()
        .next()
        .expect("one contract")
        .into_definition()
        .expect_err("must reject");
    assert_eq!(err.info().code, "assumption-dependency");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let err = load_contract_specs(&dir.path().join("absent.yaml")).expect_err("missing");
    assert!(!err.is_configuration());
    assert_eq!(err.info().code, "contract_read");
}

#[test]
fn normalized_yaml_reloads_to_the_same_contracts() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("contracts.yaml");
    fs::write(&path, REFERENCE_YAML).expect("write");
    let file = ContractFile::load(&path).expect("load");

    let normalized = file.to_yaml().expect("emit");
    assert!(normalized.contains("kind: smoothness"));
    assert!(!normalized.contains("depends_on: []"));
    let reloaded = contract_specs_from_yaml(normalized.as_bytes()).expect("reparse");
    assert_eq!(reloaded, file.contracts);

    let definitions = file.into_definitions().expect("validate");
    assert_eq!(definitions[0].guarantees().len(), 2);
}
