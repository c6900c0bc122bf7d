//! Issue mirror orchestration.
//!
//! This crate sequences one sync run: it builds the mirror index from the
//! destination database, lists the source issues, reconciles the two, and
//! applies the resulting creates and updates in bounded-concurrency batches.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The engine sequences calls between the business
//! logic in the [`mirror`] crate and the port traits (`IssueSource`,
//! `MirrorStore`). It contains no domain rules and no transport details of its
//! own.
//!
//! ## Concurrency
//!
//! A run is a single task. Concurrency exists only inside a batch, where up to
//! `batch_size` requests are awaited together; batches run strictly one after
//! another. [`SyncEngine::start_sync`] rejects overlapping runs.

pub mod batch;
pub mod error;
pub mod index;
pub mod report;
pub mod sync;

#[cfg(test)]
mod fakes;

pub use batch::{chunk_sizes, BatchExecutor, BatchReport, ItemFailure};
pub use error::SyncError;
pub use index::bootstrap_index;
pub use report::SyncReport;
pub use sync::{SyncEngine, SyncSettings};
