mod common;

use std::collections::BTreeMap;

use dpm_contract::serde::to_canonical_json_bytes;
use dpm_contract::{evaluate_contract, ContractDefinition, PredicateSpec, Snapshot};
use dpm_core::errors::DpmError;
use dpm_core::{SubsystemId, TriState};

fn observer_contract() -> Result<ContractDefinition, DpmError> {
    ContractDefinition::builder("observer")
        .assumption("A1", "Position data (eta) is missing.", PredicateSpec::available(["eta"]))
        .assumption(
            "A2",
            "Position sensors or voting system unavailable.",
            PredicateSpec::flag("sensors_available"),
        )
        .assumption(
            "A4",
            "Upstream models are not functioning.",
            PredicateSpec::upstream(["disturbance"]),
        )
        .guarantee(
            "G1",
            "WMA-based position estimate is invalid.",
            PredicateSpec::component_deviation("eta_obs", "eta", 1.0),
            &["A1", "A2", "A4"],
        )
        .build()
}

fn snapshot() -> Snapshot {
    Snapshot::new(12, 1.2)
        .with_vector("eta", vec![10.0, -4.0, 0.1])
        .with_vector("eta_obs", vec![11.5, -4.0, 0.1])
        .with_flag("sensors_available", true)
}

#[test]
fn repeated_evaluation_is_bit_identical() -> Result<(), DpmError> {
    let definition = observer_contract()?;
    let mut upstream = BTreeMap::new();
    upstream.insert(SubsystemId::new("disturbance"), TriState::Satisfied);

    let first = evaluate_contract(&definition, &snapshot(), &upstream);
    let second = evaluate_contract(&definition, &snapshot(), &upstream);

    assert_eq!(first, second);
    assert_eq!(
        to_canonical_json_bytes(&first.status)?,
        to_canonical_json_bytes(&second.status)?
    );
    assert_eq!(first.status.stable_hash()?, second.status.stable_hash()?);
    assert_eq!(first.status.result("G1"), Some(TriState::Violated));
    Ok(())
}

#[test]
fn unresolved_upstream_is_violated_not_satisfied() -> Result<(), DpmError> {
    let definition = observer_contract()?;
    let evaluation = evaluate_contract(&definition, &snapshot(), &BTreeMap::new());
    assert_eq!(evaluation.status.result("A4"), Some(TriState::Violated));
    assert_eq!(evaluation.status.result("G1"), Some(TriState::Indeterminate));
    assert_eq!(
        evaluation.violations[0].message,
        "upstream disturbance verdict unavailable"
    );
    Ok(())
}

#[test]
fn indeterminate_upstream_violates_the_assumption() -> Result<(), DpmError> {
    let definition = observer_contract()?;
    let mut upstream = BTreeMap::new();
    upstream.insert(SubsystemId::new("disturbance"), TriState::Indeterminate);
    let evaluation = evaluate_contract(&definition, &snapshot(), &upstream);
    assert_eq!(evaluation.status.result("A4"), Some(TriState::Violated));
    assert_eq!(
        evaluation.violations[0].message,
        "Upstream models are not functioning."
    );
    assert_eq!(evaluation.status.effective_guarantee(), TriState::Indeterminate);
    Ok(())
}

#[test]
fn status_summaries_follow_the_aggregation_rule() -> Result<(), DpmError> {
    let definition = observer_contract()?;
    let mut upstream = BTreeMap::new();
    upstream.insert(SubsystemId::new("disturbance"), TriState::Satisfied);
    let status = evaluate_contract(&definition, &snapshot(), &upstream).status;
    assert_eq!(status.assumptions_hold(), TriState::Satisfied);
    assert_eq!(status.effective_guarantee(), TriState::Violated);
    assert_eq!(status.guarantees().count(), 1);
    assert_eq!(status.assumptions().count(), 3);
    Ok(())
}

#[test]
fn violation_rows_round_time_to_centiseconds() -> Result<(), DpmError> {
    let definition = observer_contract()?;
    let snapshot = Snapshot::new(7, 0.123456).with_flag("sensors_available", false);
    let evaluation = evaluate_contract(&definition, &snapshot, &BTreeMap::new());
    let row = evaluation.violations[0].row();
    assert_eq!(row.time, 0.12);
    assert_eq!(row.subsystem, "observer");
    assert_eq!(row.contract_id, "A1");
    Ok(())
}
