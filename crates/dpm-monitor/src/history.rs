use dpm_contract::ContractStatus;

/// Statuses of one subsystem ordered by tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusHistory {
    entries: Vec<ContractStatus>,
}

impl StatusHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a status; returns false and drops it unless its tick is newer
    /// than the latest stored one.
    pub fn push(&mut self, status: ContractStatus) -> bool {
        if self
            .entries
            .last()
            .is_some_and(|latest| latest.tick >= status.tick)
        {
            return false;
        }
        self.entries.push(status);
        true
    }

    /// Most recent status.
    pub fn latest(&self) -> Option<&ContractStatus> {
        self.entries.last()
    }

    /// Status recorded for `tick`.
    pub fn at(&self, tick: u64) -> Option<&ContractStatus> {
        self.entries
            .binary_search_by_key(&tick, |status| status.tick)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Every stored status, oldest first.
    pub fn as_slice(&self) -> &[ContractStatus] {
        &self.entries
    }

    /// Number of stored statuses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no status has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
