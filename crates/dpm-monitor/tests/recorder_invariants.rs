mod common;

use std::thread;

use common::{chain_monitor, chain_snapshot};
use dpm_contract::ViolationRecord;
use dpm_core::errors::DpmError;
use dpm_core::{CheckId, SubsystemId};
use dpm_monitor::ViolationRecorder;

fn record(subsystem: &str, tick: u64, check: &str) -> ViolationRecord {
    ViolationRecord {
        tick,
        timestamp: tick as f64 * 0.5,
        subsystem: SubsystemId::new(subsystem),
        check: CheckId::new(check),
        message: format!("{subsystem}.{check} violated"),
    }
}

#[test]
fn export_length_matches_violated_triples() -> Result<(), DpmError> {
    let mut monitor = chain_monitor(3)?;
    let script: [&[&str]; 6] = [
        &[],
        &["up_ok"],
        &["down_ok"],
        &["root_ok", "orphan_ok"],
        &["up_ok", "root_ok"],
        &[],
    ];
    let mut violated = 0usize;
    for (tick, failing) in script.iter().enumerate() {
        let report = monitor.step(&chain_snapshot(tick as u64, failing))?;
        let triples: usize = report.statuses.values().map(|s| s.violated_count()).sum();
        assert_eq!(report.new_violations, triples);
        violated += triples;
    }
    assert_eq!(monitor.recorder().export().len(), violated);
    assert_eq!(monitor.recorder().len(), violated);
    Ok(())
}

#[test]
fn replaying_a_tick_records_nothing_new() -> Result<(), DpmError> {
    let mut monitor = chain_monitor(2)?;
    let first = monitor.step(&chain_snapshot(0, &["up_ok"]))?;
    monitor.step(&chain_snapshot(1, &[]))?;
    let before = monitor.recorder().export();

    let replayed = monitor.step(&chain_snapshot(0, &["up_ok"]))?;
    assert!(replayed.replayed);
    assert_eq!(replayed.new_violations, 0);
    assert_eq!(replayed.statuses, first.statuses);
    assert_eq!(replayed.root_verdict, first.root_verdict);
    assert_eq!(monitor.recorder().export(), before);
    assert_eq!(monitor.history("up").map(|h| h.len()), Some(2));
    Ok(())
}

#[test]
fn ticks_must_move_forward() -> Result<(), DpmError> {
    let mut monitor = chain_monitor(1)?;
    monitor.step(&chain_snapshot(2, &[]))?;
    monitor.step(&chain_snapshot(4, &[]))?;

    let skipped = monitor.step(&chain_snapshot(3, &[])).expect_err("gap");
    assert!(!skipped.is_configuration());
    assert_eq!(skipped.info().code, "tick-order");

    let mut early = chain_snapshot(5, &[]);
    early.timestamp = 0.1;
    assert_eq!(monitor.step(&early).expect_err("time").info().code, "timestamp-order");

    let mut shifted = chain_snapshot(4, &[]);
    shifted.timestamp = 9.0;
    assert_eq!(monitor.step(&shifted).expect_err("replay").info().code, "replay-mismatch");
    assert_eq!(monitor.last_tick(), Some(4));
    Ok(())
}

#[test]
fn queries_serve_the_rendering_side() -> Result<(), DpmError> {
    let mut monitor = chain_monitor(1)?;
    for tick in 0..4 {
        monitor.step(&chain_snapshot(tick, &["orphan_ok"]))?;
    }
    assert_eq!(monitor.latest_status("orphan").map(|s| s.tick), Some(3));
    assert_eq!(monitor.status_at("orphan", 1).map(|s| s.tick), Some(1));
    assert!(monitor.status_at("orphan", 9).is_none());
    assert!(monitor.latest_status("ghost").is_none());

    let recent = monitor.recorder().recent(2);
    assert_eq!(recent.iter().map(|r| r.tick).collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(monitor.recent_violations().len(), 4);

    let window = monitor.recorder().export_range(0.1, 0.2);
    assert_eq!(window.iter().map(|r| r.tick).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(monitor.recorder().export_rows()[3].time, 0.3);
    Ok(())
}

#[test]
fn exports_are_owned_copies() {
    let recorder = ViolationRecorder::new();
    recorder.collect(vec![record("dp", 0, "A1")]);
    let mut snapshot = recorder.export();
    snapshot.clear();
    recorder.collect(vec![record("dp", 1, "A1")]);
    assert_eq!(recorder.len(), 2);
    assert_eq!(recorder.count_for("dp"), 2);
    assert_eq!(recorder.count_for("thrust"), 0);
}

#[test]
fn duplicate_records_are_kept() {
    let recorder = ViolationRecorder::new();
    let twice = vec![record("ship", 3, "G1"), record("ship", 3, "G1")];
    assert_eq!(recorder.collect(twice), 2);
    assert_eq!(recorder.collect(Vec::new()), 0);
    assert_eq!(recorder.len(), 2);
}

#[test]
fn mixed_batches_are_attributed_per_record() {
    let recorder = ViolationRecorder::new();
    let batch = vec![record("dp", 2, "A4"), record("thrust", 2, "A4"), record("dp", 3, "G1")];
    assert_eq!(recorder.collect(batch), 3);
    assert_eq!(recorder.count_for("dp"), 2);
    assert_eq!(recorder.count_for("thrust"), 1);
    let rows = recorder.export_rows();
    assert_eq!(rows[1].subsystem, "thrust");
    assert_eq!(rows[2].time, 1.5);
}

#[test]
fn concurrent_writers_lose_nothing_and_keep_their_order() {
    let recorder = ViolationRecorder::new();
    let writers = ["disturbance", "reference", "observer", "dp", "thrust", "ship"];
    thread::scope(|scope| {
        for name in writers {
            let recorder = &recorder;
            scope.spawn(move || {
                for tick in 0..200u64 {
                    recorder.collect(vec![record(name, tick, "A1"), record(name, tick, "G1")]);
                }
            });
        }
    });
    assert_eq!(recorder.len(), writers.len() * 400);
    let exported = recorder.export();
    for name in writers {
        let own: Vec<(u64, String)> = exported
            .iter()
            .filter(|r| r.subsystem.as_str() == name)
            .map(|r| (r.tick, r.check.to_string()))
            .collect();
        assert_eq!(own.len(), 400);
        let in_order = own.windows(2).all(|pair| {
            pair[0].0 < pair[1].0 || (pair[0].0 == pair[1].0 && pair[0].1 == "A1" && pair[1].1 == "G1")
        });
        assert!(in_order, "{name} records out of order");
    }
}
