//! Issue mirror CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: defaults, `issue-mirror.toml`, then the
//!    environment (see [`config`]).
//! 2. **Wire observability**: `tracing-subscriber` with a pretty or JSON layer
//!    and, when configured, an OpenTelemetry OTLP exporter. All spans and
//!    events emitted by every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: `GithubClient` and `NotionClient`, injected
//!    into `SyncEngine`.
//! 4. **Dispatch**: `sync` triggers one sync run; `add-entry` appends a single
//!    text row to the entry database.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod telemetry;

use commands::SyncArgs;
use config::Config;

#[derive(Debug, Parser)]
#[command(name = "issue-mirror", version, about = "Mirror GitHub issues into a Notion database")]
struct Cli {
    /// Config file (default: ./issue-mirror.toml, if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mirror every issue of the configured repository into the database.
    Sync(SyncArgs),
    /// Append one entry to the entry database.
    AddEntry {
        /// Title of the new entry.
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {:#}", anyhow::Error::from(err));
            return ExitCode::FAILURE;
        }
    };
    let telemetry = match telemetry::init(&config) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Sync(args) => commands::sync(&config, args, cli.json).await,
        Command::AddEntry { text } => commands::add_entry(&config, &text, cli.json).await,
    };

    let code = result.unwrap_or_else(|err| {
        tracing::error!("Command failed: {err:#}");
        ExitCode::FAILURE
    });
    telemetry.shutdown();
    code
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use mirror::FailurePolicy;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sync_overrides_parse() {
        let cli = Cli::parse_from([
            "issue-mirror",
            "sync",
            "--batch-size",
            "5",
            "--failure-policy",
            "continue",
            "--json",
        ]);
        assert!(cli.json);
        let Command::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.batch_size.map(|b| b.get()), Some(5));
        assert_eq!(args.failure_policy, Some(FailurePolicy::ContinueOnError));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(Cli::try_parse_from(["issue-mirror", "sync", "--batch-size", "0"]).is_err());
    }

    #[test]
    fn add_entry_takes_text() {
        let cli = Cli::parse_from(["issue-mirror", "add-entry", "Yurts in Big Sur, California"]);
        assert!(matches!(
            cli.command,
            Command::AddEntry { ref text } if text == "Yurts in Big Sur, California"
        ));
    }
}
