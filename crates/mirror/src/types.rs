//! Shared value types for the issue mirror domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. a batch size is never zero, an issue
//! number appears at most once in a [`MirrorIndex`]).

use std::collections::HashMap;
use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{IssueNumber, PageCursor, PageId};

// ---------------------------------------------------------------------------
// Source side
// ---------------------------------------------------------------------------

/// Open/closed state of a GitHub issue.
///
/// The lowercase string form is what the mirror writes into the `State`
/// select property, verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Returns the state as GitHub spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one GitHub issue (never a pull request).
///
/// Fetched fresh on every sync; nothing about it is persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number, unique per repository.
    pub number: IssueNumber,
    pub title: String,
    pub state: IssueState,
    /// Number of comments on the issue.
    pub comment_count: u64,
    /// Canonical browser URL of the issue.
    pub url: String,
}

// ---------------------------------------------------------------------------
// Destination side
// ---------------------------------------------------------------------------

/// Projection of one row of the mirror database, as read at sync start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRow {
    pub page_id: PageId,
    /// `None` when the row has no (or an empty) `Issue Number` property.
    pub issue_number: Option<IssueNumber>,
}

/// One page of a database query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowPage {
    pub rows: Vec<MirrorRow>,
    /// Cursor for the following page; `None` once the query is exhausted.
    pub next_cursor: Option<PageCursor>,
    /// Results the store returned without a usable page id.
    pub unidentified: usize,
}

/// Outcome of adding a row to a [`MirrorIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexInsert {
    /// The row's issue number was new and is now indexed.
    Inserted,
    /// Another row already claimed this issue number; the earlier row is kept.
    Duplicate { kept: PageId },
    /// The row carries no issue number and cannot be indexed.
    MissingIssueNumber,
}

/// Mapping from issue number to the mirrored row that represents it.
///
/// Built once per sync and read-only afterwards. Each issue number appears at
/// most once; the first row seen for a number wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MirrorIndex {
    entries: HashMap<IssueNumber, PageId>,
    skipped_rows: usize,
}

impl MirrorIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one row, reporting whether it was indexed.
    pub fn insert(&mut self, row: MirrorRow) -> IndexInsert {
        let Some(number) = row.issue_number else {
            self.skipped_rows += 1;
            return IndexInsert::MissingIssueNumber;
        };
        if let Some(kept) = self.entries.get(&number) {
            self.skipped_rows += 1;
            return IndexInsert::Duplicate { kept: kept.clone() };
        }
        self.entries.insert(number, row.page_id);
        IndexInsert::Inserted
    }

    /// Returns the row mirroring `number`, if any.
    pub fn get(&self, number: IssueNumber) -> Option<&PageId> {
        self.entries.get(&number)
    }

    /// Number of indexed issues.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records `count` rows that were read but could not be identified.
    pub fn skip_unidentified(&mut self, count: usize) {
        self.skipped_rows += count;
    }

    /// Rows that were read but not indexed (missing id, missing number or
    /// duplicate).
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

impl FromIterator<MirrorRow> for MirrorIndex {
    fn from_iter<T: IntoIterator<Item = MirrorRow>>(iter: T) -> Self {
        let mut index = Self::new();
        for row in iter {
            index.insert(row);
        }
        index
    }
}

impl<const N: usize> From<[(IssueNumber, PageId); N]> for MirrorIndex {
    fn from(pairs: [(IssueNumber, PageId); N]) -> Self {
        pairs
            .into_iter()
            .map(|(number, page_id)| MirrorRow {
                page_id,
                issue_number: Some(number),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Kind of write applied to the mirror database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// A single write decided by the reconciler.
///
/// Lives only for one sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Add a new row for an issue that has no mirror yet.
    Create(Issue),
    /// Overwrite every mapped property of an existing row.
    Update { page_id: PageId, issue: Issue },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Create(_) => OperationKind::Create,
            Self::Update { .. } => OperationKind::Update,
        }
    }

    /// The issue whose current data the operation writes.
    pub fn issue(&self) -> &Issue {
        match self {
            Self::Create(issue) | Self::Update { issue, .. } => issue,
        }
    }
}

// ---------------------------------------------------------------------------
// Execution tuning
// ---------------------------------------------------------------------------

/// Maximum number of operations in flight at once (the chunk size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    /// Batch size used when none is configured.
    pub const DEFAULT: usize = 10;

    /// Creates a [`BatchSize`], returning `None` for zero.
    #[must_use]
    pub fn new(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(NonZeroUsize::new(Self::DEFAULT).unwrap_or(NonZeroUsize::MIN))
    }
}

impl TryFrom<usize> for BatchSize {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "batch size must be at least 1".to_string())
    }
}

impl From<BatchSize> for usize {
    fn from(size: BatchSize) -> Self {
        size.get()
    }
}

impl std::str::FromStr for BatchSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid batch size '{s}'"))?;
        Self::try_from(value)
    }
}

impl std::fmt::Display for BatchSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the batched executor does when an operation in a chunk fails.
///
/// Either way the failing chunk is allowed to settle, so every started
/// operation has a recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop after the chunk containing the first failure; later chunks are skipped.
    #[default]
    FailFast,
    /// Record the failure and keep executing every remaining chunk.
    #[serde(alias = "continue")]
    ContinueOnError,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "continue" | "continue_on_error" => Ok(Self::ContinueOnError),
            other => Err(format!(
                "invalid failure policy '{other}', expected 'fail_fast' or 'continue'"
            )),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailFast => f.write_str("fail_fast"),
            Self::ContinueOnError => f.write_str("continue"),
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
