use crate::remote::RemoteTable;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// Every unit reached the remote store
    Success,
    /// At least one unit failed; the rest were still attempted
    PartialFailure,
    /// No live remote session; nothing was written
    NotAuthenticated,
}

/// One entity that did not reach the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFailure {
    pub table: RemoteTable,
    /// Local identifier of the unit the failed row belongs to
    pub local_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub outcome: MigrationOutcome,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    pub failures: Vec<MigrationFailure>,
    /// Local keys removed by the cutover step
    pub cleared_keys: Vec<String>,
    /// Order or transaction shards the run never read, left in place by the
    /// cutover step
    pub kept_keys: Vec<String>,
    /// Set when the cutover step was requested but could not finish
    pub clear_error: Option<String>,
}

impl MigrationReport {
    pub(crate) fn not_authenticated() -> Self {
        Self {
            outcome: MigrationOutcome::NotAuthenticated,
            completed: 0,
            failed: 0,
            total: 0,
            failures: Vec::new(),
            cleared_keys: Vec::new(),
            kept_keys: Vec::new(),
            clear_error: None,
        }
    }

    pub fn success(&self) -> bool {
        self.outcome == MigrationOutcome::Success
    }

    pub fn local_cleared(&self) -> bool {
        !self.cleared_keys.is_empty() && self.clear_error.is_none()
    }

    /// Failure count per remote table, for the summary line
    pub fn failures_by_table(&self) -> Vec<(RemoteTable, usize)> {
        let mut counts: Vec<(RemoteTable, usize)> = Vec::new();
        for failure in &self.failures {
            match counts.iter_mut().find(|(table, _)| *table == failure.table) {
                Some((_, count)) => *count += 1,
                None => counts.push((failure.table, 1)),
            }
        }
        counts.sort();
        counts
    }
}
