//! Configuration loading and per-command validation.
//!
//! Precedence (lowest to highest):
//! 1. Built-in defaults
//! 2. `issue-mirror.toml` in the working directory, or the `--config` file
//! 3. Environment variables: the deployment names (`GITHUB_KEY`, `NOTION_KEY`,
//!    ...) and `ISSUE_MIRROR_*` for everything else

use std::path::{Path, PathBuf};

use engine::SyncSettings;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use mirror::{BatchSize, DatabaseId, FailurePolicy, RepositoryName, RepositoryOwner, RepositoryRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "issue-mirror.toml";

/// Environment variables read without a prefix.
const DEPLOYMENT_ENV: &[&str] = &[
    "GITHUB_KEY",
    "GITHUB_REPO_OWNER",
    "GITHUB_REPO_NAME",
    "NOTION_KEY",
    "NOTION_DATABASE_ID",
    "NOTION_QA_DB_KEY",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to load configuration")]
    Load(#[source] Box<figment::Error>),

    #[error("missing required setting {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github_key: Option<String>,
    pub github_repo_owner: Option<String>,
    pub github_repo_name: Option<String>,
    pub github_api_url: String,

    pub notion_key: Option<String>,
    /// Database holding the issue mirror.
    pub notion_database_id: Option<String>,
    /// Database that `add-entry` appends to.
    pub notion_qa_db_key: Option<String>,
    pub notion_api_url: String,

    pub batch_size: BatchSize,
    pub failure_policy: FailurePolicy,

    /// Default tracing filter; `RUST_LOG` wins when set.
    pub log_level: String,
    pub log_format: LogFormat,
    /// OTLP/gRPC collector endpoint; spans are only exported when set.
    pub otlp_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_key: None,
            github_repo_owner: None,
            github_repo_name: None,
            github_api_url: github::DEFAULT_API_URL.to_string(),
            notion_key: None,
            notion_database_id: None,
            notion_qa_db_key: None,
            notion_api_url: notion::DEFAULT_API_URL.to_string(),
            batch_size: BatchSize::default(),
            failure_policy: FailurePolicy::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            otlp_endpoint: None,
        }
    }
}

/// Everything the `sync` command needs, validated.
#[derive(Debug, Clone)]
pub struct SyncTargets {
    pub github_token: String,
    pub notion_token: String,
    pub settings: SyncSettings,
}

/// Everything the `add-entry` command needs, validated.
#[derive(Debug, Clone)]
pub struct EntryTarget {
    pub notion_token: String,
    pub database: DatabaseId,
}

impl Config {
    /// Loads configuration from defaults, the config file, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if !path.exists() => return Err(ConfigError::FileNotFound(path.into())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::raw().only(DEPLOYMENT_ENV))
            .merge(Env::prefixed("ISSUE_MIRROR_"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    pub fn sync_targets(&self) -> Result<SyncTargets, ConfigError> {
        let repository = RepositoryRef::new(
            required(&self.github_repo_owner, "GITHUB_REPO_OWNER", RepositoryOwner::new)?,
            required(&self.github_repo_name, "GITHUB_REPO_NAME", RepositoryName::new)?,
        );
        Ok(SyncTargets {
            github_token: required(&self.github_key, "GITHUB_KEY", non_blank)?,
            notion_token: required(&self.notion_key, "NOTION_KEY", non_blank)?,
            settings: SyncSettings {
                repository,
                database: required(&self.notion_database_id, "NOTION_DATABASE_ID", DatabaseId::new)?,
                batch_size: self.batch_size,
                failure_policy: self.failure_policy,
            },
        })
    }

    pub fn entry_target(&self) -> Result<EntryTarget, ConfigError> {
        Ok(EntryTarget {
            notion_token: required(&self.notion_key, "NOTION_KEY", non_blank)?,
            database: required(&self.notion_qa_db_key, "NOTION_QA_DB_KEY", DatabaseId::new)?,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

fn required<T>(
    value: &Option<String>,
    key: &'static str,
    parse: impl FnOnce(String) -> Option<T>,
) -> Result<T, ConfigError> {
    value
        .clone()
        .and_then(parse)
        .ok_or(ConfigError::Missing(key))
}
