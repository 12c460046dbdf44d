//! Status - 自動完了サブシステムの観測用の値
//!
//! スキャン 1 回分の集計と、ワーカーが 1 件ごとに下した判断を表します。

/// Result of one scanner tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Eligible records returned by the store.
    pub found: usize,
    /// Ids accepted by the queue.
    pub queued: usize,
    /// Ids dropped because the queue was full (or closed).
    pub dropped: usize,
}

/// What a worker decided for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCompleteOutcome {
    /// Transitioned to `completed`.
    Completed,
    /// Record was deleted after the scan.
    Missing,
    /// Already `completed` (by the owner or an earlier run).
    AlreadyTerminal,
    /// Age re-check failed against the current clock.
    NotYetDue,
    /// Store error other than not-found; candidate dropped.
    Failed,
}

impl AutoCompleteOutcome {
    /// Did this outcome mutate the store?
    pub fn mutated(self) -> bool {
        matches!(self, AutoCompleteOutcome::Completed)
    }
}
