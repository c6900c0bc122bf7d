//! Subcommand implementations.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use engine::{SyncEngine, SyncReport};
use github::{GithubClient, GithubConfig};
use mirror::{BatchSize, FailurePolicy};
use notion::{NotionClient, NotionConfig};
use tracing::{error, info, warn};

use crate::config::Config;

/// Overrides for the `sync` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SyncArgs {
    /// Maximum number of concurrent writes per batch.
    #[arg(long)]
    pub batch_size: Option<BatchSize>,

    /// What to do when a write fails: `fail_fast` or `continue`.
    #[arg(long)]
    pub failure_policy: Option<FailurePolicy>,
}

/// Runs one sync of the configured repository into the mirror database.
pub async fn sync(config: &Config, args: SyncArgs, json: bool) -> Result<ExitCode> {
    let mut targets = config.sync_targets()?;
    if let Some(batch_size) = args.batch_size {
        targets.settings.batch_size = batch_size;
    }
    if let Some(policy) = args.failure_policy {
        targets.settings.failure_policy = policy;
    }

    let mut github_config = GithubConfig::new(targets.github_token);
    github_config.api_url = config.github_api_url.clone();
    let mut notion_config = NotionConfig::new(targets.notion_token);
    notion_config.api_url = config.notion_api_url.clone();

    let source = GithubClient::new(github_config).context("failed to build GitHub client")?;
    let store = NotionClient::new(notion_config).context("failed to build Notion client")?;
    let engine = SyncEngine::new(Arc::new(source), Arc::new(store), targets.settings);

    info!(
        batch_size = %engine.settings().batch_size,
        failure_policy = %engine.settings().failure_policy,
        "Starting sync"
    );
    match engine.start_sync().await {
        Ok(report) => {
            emit_report(&report, json)?;
            Ok(exit_code(&report))
        }
        Err(err) => {
            if let Some(report) = err.report() {
                emit_report(report, json)?;
            }
            Err(err.into())
        }
    }
}

/// Appends one text entry to the entry database.
pub async fn add_entry(config: &Config, text: &str, json: bool) -> Result<ExitCode> {
    let target = config.entry_target()?;
    let mut notion_config = NotionConfig::new(target.notion_token);
    notion_config.api_url = config.notion_api_url.clone();
    let client = NotionClient::new(notion_config).context("failed to build Notion client")?;

    match client.add_entry(&target.database, text).await {
        Ok(page) => {
            if json {
                println!("{}", serde_json::json!({ "page_id": page.as_str() }));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(error = %err, "Failed to add entry");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// A finished run still fails the process when any item failed.
fn exit_code(report: &SyncReport) -> ExitCode {
    if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn emit_report(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("failed to serialise report")?
        );
    }
    for failure in report.created.failed.iter().chain(&report.updated.failed) {
        warn!(
            issue = %failure.issue,
            error = %failure.error,
            retryable = failure.retry.is_retryable(),
            "Item failed"
        );
    }
    info!(
        run_id = %report.run_id,
        fetched = report.fetched,
        created = report.created.succeeded,
        updated = report.updated.succeeded,
        failed = report.failed(),
        skipped = report.created.skipped + report.updated.skipped,
        "Sync summary"
    );
    Ok(())
}
