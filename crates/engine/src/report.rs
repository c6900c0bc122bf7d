//! Structured result of one sync run.

use mirror::{SyncRunId, Timestamp};
use serde::Serialize;

use crate::BatchReport;

/// Counts and per-item failures of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub run_id: SyncRunId,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    /// Issues listed by the source (pull requests excluded).
    pub fetched: usize,
    /// Rows found in the mirror index.
    pub indexed: usize,
    /// Mirror rows ignored while building the index.
    pub skipped_rows: usize,
    pub created: BatchReport,
    pub updated: BatchReport,
}

impl SyncReport {
    /// Operations that failed across both phases.
    pub fn failed(&self) -> usize {
        self.created.failed.len() + self.updated.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}
