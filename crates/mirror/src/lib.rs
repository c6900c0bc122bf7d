//! Core domain for the GitHub issue mirror.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and port trait used by the sync. Infrastructure crates implement the
//! traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `github` and `notion` crates define *how*
//! to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`IssueNumber`, `PageId`, `DatabaseId`, etc.) |
//! | [`types`] | Value types (`Issue`, `MirrorIndex`, `Operation`, `BatchSize`, etc.) |
//! | [`properties`] | Field mapping from issues to database properties |
//! | [`reconcile`] | Create/update partitioning |
//! | [`errors`] | Port error and retry-policy types |
//! | [`ports`] | `IssueSource` and `MirrorStore` traits |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod properties;
pub mod reconcile;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{PortError, RetryPolicy, Service};
pub use identifiers::{
    DatabaseId, IssueNumber, PageCursor, PageId, RepositoryName, RepositoryOwner, RepositoryRef,
    SyncRunId,
};
pub use ports::{IssueSource, MirrorStore};
pub use properties::{entry_properties, issue_properties, PropertySet, PropertyValue};
pub use reconcile::{reconcile, Reconciliation};
pub use types::{
    BatchSize, FailurePolicy, IndexInsert, Issue, IssueState, MirrorIndex, MirrorRow, Operation,
    OperationKind, RowPage, Timestamp,
};
