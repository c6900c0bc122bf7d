//! Errors that halt a sync run.

use mirror::{OperationKind, PortError};
use thiserror::Error;

use crate::SyncReport;

/// Conditions that stop a sync before it completes.
///
/// Individual operation failures are not errors at this level unless the
/// failure policy is fail-fast; otherwise they are recorded in the
/// [`SyncReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// Another sync on the same engine has not finished yet.
    #[error("a sync is already in progress")]
    AlreadyRunning,

    /// The mirror database could not be read completely.
    #[error("failed to read the mirror database")]
    IndexBootstrap(#[source] PortError),

    /// The source repository's issues could not be listed completely.
    #[error("failed to list repository issues")]
    IssueFetch(#[source] PortError),

    /// A fail-fast batch run stopped early.
    ///
    /// `report` holds everything that was applied before the stop.
    #[error("sync stopped during the {kind} phase after {failed} failed operation(s)")]
    Aborted {
        kind: OperationKind,
        failed: usize,
        report: Box<SyncReport>,
    },
}

impl SyncError {
    /// The partial report of an aborted run, if any work was done.
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Aborted { report, .. } => Some(report),
            _ => None,
        }
    }
}
