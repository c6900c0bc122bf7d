//! Port traits implemented by the infrastructure adapters.
//!
//! The orchestration layer depends only on these traits, so a sync can be run
//! against in-memory fakes as easily as against the real services.

use async_trait::async_trait;

use crate::{DatabaseId, Issue, PageCursor, PageId, PortError, PropertySet, RepositoryRef, RowPage};

/// Read access to the issues of a source repository.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Returns every issue of `repo`, open and closed, excluding pull requests,
    /// in the order the source lists them.
    ///
    /// Pagination is exhausted before returning; any page failure fails the
    /// whole call.
    async fn list_issues(&self, repo: &RepositoryRef) -> Result<Vec<Issue>, PortError>;
}

/// Read/write access to the database that holds the mirror.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Fetches one page of rows, starting at `cursor` (or at the beginning).
    async fn query_rows(
        &self,
        database: &DatabaseId,
        cursor: Option<&PageCursor>,
    ) -> Result<RowPage, PortError>;

    /// Adds a row to `database` and returns its identifier.
    async fn create_page(
        &self,
        database: &DatabaseId,
        properties: &PropertySet,
    ) -> Result<PageId, PortError>;

    /// Overwrites the given properties of an existing row.
    async fn update_page(&self, page: &PageId, properties: &PropertySet) -> Result<(), PortError>;
}
