//! Bounded-concurrency execution of mirror operations.
//!
//! Operations are split into contiguous chunks of at most
//! [`BatchSize`] items. The operations of one chunk run concurrently on the
//! calling task; a chunk must fully settle before the next one starts, so at
//! most `batch_size` requests are ever in flight.

use std::future::Future;

use futures::future::join_all;
use mirror::{BatchSize, FailurePolicy, IssueNumber, Operation, OperationKind, PortError, RetryPolicy};
use serde::Serialize;
use tracing::{info, warn};

/// A single operation that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub issue: IssueNumber,
    pub error: PortError,
    pub retry: RetryPolicy,
}

/// Outcome of one executor run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchReport {
    /// Sizes of the chunks that were executed, in execution order.
    pub chunk_sizes: Vec<usize>,
    pub succeeded: usize,
    pub failed: Vec<ItemFailure>,
    /// Operations never started because an earlier chunk failed.
    pub skipped: usize,
    /// Set when a failure stopped the run under [`FailurePolicy::FailFast`],
    /// even if the failing chunk was the last one.
    pub aborted: bool,
}

impl BatchReport {
    /// Report for a run that never started any of its `count` operations.
    pub fn skipped(count: usize) -> Self {
        Self {
            skipped: count,
            ..Self::default()
        }
    }

    /// Operations that were started.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    /// `true` when a failure stopped the run under fail-fast.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

/// Sizes of the chunks `len` operations are split into.
///
/// Every chunk holds `batch_size` operations except possibly the last.
pub fn chunk_sizes(len: usize, batch_size: BatchSize) -> Vec<usize> {
    let size = batch_size.get();
    (0..len.div_ceil(size))
        .map(|chunk| size.min(len - chunk * size))
        .collect()
}

/// Applies operations of one kind in sequential, internally concurrent chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchExecutor {
    batch_size: BatchSize,
    policy: FailurePolicy,
}

impl BatchExecutor {
    pub fn new(batch_size: BatchSize, policy: FailurePolicy) -> Self {
        Self { batch_size, policy }
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Runs `apply` on every operation, chunk by chunk, preserving input order.
    ///
    /// Under [`FailurePolicy::FailFast`] the chunk containing the first failure
    /// still settles completely, then the remaining operations are skipped.
    pub async fn run<F, Fut>(
        &self,
        kind: OperationKind,
        operations: Vec<Operation>,
        apply: F,
    ) -> BatchReport
    where
        F: Fn(Operation) -> Fut,
        Fut: Future<Output = Result<(), PortError>>,
    {
        let total = operations.len();
        let mut report = BatchReport::default();
        let mut pending = operations.into_iter();

        loop {
            let chunk: Vec<Operation> = pending.by_ref().take(self.batch_size.get()).collect();
            if chunk.is_empty() {
                break;
            }
            let size = chunk.len();

            let outcomes = join_all(chunk.into_iter().map(|operation| {
                let issue = operation.issue().number;
                let fut = apply(operation);
                async move { (issue, fut.await) }
            }))
            .await;

            let mut chunk_failures = 0;
            for (issue, outcome) in outcomes {
                match outcome {
                    Ok(()) => report.succeeded += 1,
                    Err(error) => {
                        chunk_failures += 1;
                        warn!(%kind, %issue, %error, "Operation failed");
                        report.failed.push(ItemFailure {
                            issue,
                            retry: error.retry_policy(),
                            error,
                        });
                    }
                }
            }
            report.chunk_sizes.push(size);
            info!(%kind, size, failed = chunk_failures, "Completed batch");

            if chunk_failures > 0 && self.policy == FailurePolicy::FailFast {
                report.aborted = true;
                report.skipped = total - report.attempted();
                if report.skipped > 0 {
                    warn!(%kind, skipped = report.skipped, "Stopping after failed batch");
                }
                break;
            }
        }

        report
    }
}
