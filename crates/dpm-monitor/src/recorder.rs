use dpm_contract::{ViolationRecord, ViolationRow};
use parking_lot::Mutex;
use tracing::warn;

/// Append-only, ordered log of every violation observed during a run.
///
/// Writers only take the lock for the duration of an extend, and readers
/// receive owned copies, so an export can never be invalidated by later
/// collection.
#[derive(Debug, Default)]
pub struct ViolationRecorder {
    entries: Mutex<Vec<ViolationRecord>>,
}

impl ViolationRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch of violations.
    ///
    /// Entries are kept in arrival order and never deduplicated. Each record
    /// is logged with its own subsystem and timestamp. Returns the number of
    /// appended records.
    pub fn collect(&self, violations: Vec<ViolationRecord>) -> usize {
        for record in &violations {
            warn!(
                subsystem = %record.subsystem,
                tick = record.tick,
                time = record.timestamp,
                check = %record.check,
                message = %record.message,
                "contract violation"
            );
        }
        let appended = violations.len();
        if appended > 0 {
            self.entries.lock().extend(violations);
        }
        appended
    }

    /// Full ordered sequence of records.
    pub fn export(&self) -> Vec<ViolationRecord> {
        self.entries.lock().clone()
    }

    /// Full sequence as `(time, subsystem, check id, message)` rows.
    pub fn export_rows(&self) -> Vec<ViolationRow> {
        self.entries.lock().iter().map(ViolationRecord::row).collect()
    }

    /// Records with `start <= timestamp <= end`, in order.
    pub fn export_range(&self, start: f64, end: f64) -> Vec<ViolationRecord> {
        self.entries
            .lock()
            .iter()
            .filter(|record| record.timestamp >= start && record.timestamp <= end)
            .cloned()
            .collect()
    }

    /// The `count` most recent records, oldest first.
    pub fn recent(&self, count: usize) -> Vec<ViolationRecord> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(count);
        entries[skip..].to_vec()
    }

    /// Number of records owned by `subsystem`.
    pub fn count_for(&self, subsystem: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|record| record.subsystem.as_str() == subsystem)
            .count()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
