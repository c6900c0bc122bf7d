//! The sync entry point.

use std::sync::Arc;

use mirror::{
    issue_properties, reconcile, BatchSize, DatabaseId, FailurePolicy, IssueSource, MirrorStore,
    Operation, OperationKind, PortError, RepositoryRef, SyncRunId, Timestamp,
};
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, Instrument};

use crate::{bootstrap_index, BatchExecutor, BatchReport, SyncError, SyncReport};

/// Where to sync from and to, and how hard to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub repository: RepositoryRef,
    pub database: DatabaseId,
    pub batch_size: BatchSize,
    pub failure_policy: FailurePolicy,
}

/// Mirrors the issues of one repository into one database.
///
/// Holds no state between runs apart from the in-flight guard: the mirror
/// index is rebuilt from the database at the start of every run.
pub struct SyncEngine {
    source: Arc<dyn IssueSource>,
    store: Arc<dyn MirrorStore>,
    settings: SyncSettings,
    in_flight: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn IssueSource>,
        store: Arc<dyn MirrorStore>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
            in_flight: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Runs one full sync.
    ///
    /// Fails with [`SyncError::AlreadyRunning`] instead of waiting if another
    /// run on this engine is still in progress.
    pub async fn start_sync(&self) -> Result<SyncReport, SyncError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| SyncError::AlreadyRunning)?;

        let run_id = SyncRunId::new_random();
        let span = info_span!(
            "sync",
            %run_id,
            repository = %self.settings.repository,
            database = %self.settings.database
        );
        self.run(run_id).instrument(span).await
    }

    async fn run(&self, run_id: SyncRunId) -> Result<SyncReport, SyncError> {
        let started_at = Timestamp::now();
        info!("Starting sync");

        let index = bootstrap_index(self.store.as_ref(), &self.settings.database)
            .await
            .map_err(SyncError::IndexBootstrap)?;

        let issues = self
            .source
            .list_issues(&self.settings.repository)
            .await
            .map_err(SyncError::IssueFetch)?;
        let fetched = issues.len();
        info!(fetched, "Fetched issues from the repository");

        let plan = reconcile(issues, &index);
        let executor = BatchExecutor::new(self.settings.batch_size, self.settings.failure_policy);

        let mut report = SyncReport {
            run_id,
            started_at,
            finished_at: started_at,
            fetched,
            indexed: index.len(),
            skipped_rows: index.skipped_rows(),
            created: BatchReport::default(),
            updated: BatchReport::skipped(plan.to_update.len()),
        };

        info!(count = plan.to_create.len(), "New issues to add to the mirror");
        report.created = executor
            .run(OperationKind::Create, plan.creates().collect(), |op| self.apply(op))
            .await;
        if report.created.is_aborted() {
            return Err(self.abort(OperationKind::Create, report));
        }

        info!(count = plan.to_update.len(), "Issues to update in the mirror");
        report.updated = executor
            .run(OperationKind::Update, plan.updates().collect(), |op| self.apply(op))
            .await;
        if report.updated.is_aborted() {
            return Err(self.abort(OperationKind::Update, report));
        }

        report.finished_at = Timestamp::now();
        info!(
            created = report.created.succeeded,
            updated = report.updated.succeeded,
            failed = report.failed(),
            "Mirror database is synced with the repository"
        );
        Ok(report)
    }

    async fn apply(&self, operation: Operation) -> Result<(), PortError> {
        match operation {
            Operation::Create(issue) => {
                let page = self
                    .store
                    .create_page(&self.settings.database, &issue_properties(&issue))
                    .await?;
                debug!(issue = %issue.number, %page, "Created row");
                Ok(())
            }
            Operation::Update { page_id, issue } => {
                self.store
                    .update_page(&page_id, &issue_properties(&issue))
                    .await?;
                debug!(issue = %issue.number, page = %page_id, "Updated row");
                Ok(())
            }
        }
    }

    fn abort(&self, kind: OperationKind, mut report: SyncReport) -> SyncError {
        report.finished_at = Timestamp::now();
        SyncError::Aborted {
            kind,
            failed: report.failed(),
            report: Box::new(report),
        }
    }
}
