#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dpm_contract::{CheckOutcome, EvalContext, FnPredicate, Snapshot};
use dpm_core::{SubsystemId, TriState};

pub fn no_upstream() -> BTreeMap<SubsystemId, TriState> {
    BTreeMap::new()
}

pub fn fixed(holds: bool) -> FnPredicate<impl Fn(&EvalContext<'_>) -> CheckOutcome + Send + Sync> {
    FnPredicate::new("fixed", move |_ctx: &EvalContext<'_>| {
        CheckOutcome::from_bool(holds)
    })
}

/// Predicate that counts its invocations and always holds.
pub fn counting(
    counter: Arc<AtomicUsize>,
) -> FnPredicate<impl Fn(&EvalContext<'_>) -> CheckOutcome + Send + Sync> {
    FnPredicate::new("counting", move |_ctx: &EvalContext<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
        CheckOutcome::pass()
    })
}

pub fn pose_snapshot(tick: u64, eta: [f64; 3], eta_sp: [f64; 3]) -> Snapshot {
    Snapshot::new(tick, tick as f64 * 0.1)
        .with_vector("eta", eta.to_vec())
        .with_vector("eta_sp", eta_sp.to_vec())
}
