//! HTTP client for the GitHub REST API.

use std::time::Duration;

use async_trait::async_trait;
use mirror::{Issue, IssueSource, PortError, RepositoryRef, RetryPolicy, Service};
use reqwest::{header, Client as ReqwestClient, Response, StatusCode};
use tracing::{debug, info, instrument};

use crate::listing::{issues_from_listing, next_page_url, ListedIssue};

/// Default public API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Personal access or installation token.
    pub token: String,
    /// API root, without a trailing slash.
    pub api_url: String,
    /// Items requested per listing page (GitHub caps this at 100).
    pub per_page: u8,
    pub timeout: Duration,
}

impl GithubConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            per_page: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

/// [`IssueSource`] backed by the GitHub issues endpoint.
pub struct GithubClient {
    http: ReqwestClient,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, PortError> {
        let http = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(concat!("issue-mirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| transport(&e))?;
        Ok(Self { http, config })
    }

    fn issues_url(&self, repo: &RepositoryRef) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.config.api_url.trim_end_matches('/'),
            repo.owner,
            repo.name
        )
    }

    /// Fetches one listing page and returns its items and the next page URL.
    async fn fetch_page(
        &self,
        url: &str,
        first: bool,
    ) -> Result<(Vec<ListedIssue>, Option<String>), PortError> {
        let mut request = self
            .http
            .get(url)
            .bearer_auth(&self.config.token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if first {
            request = request.query(&[
                ("state", "all".to_string()),
                ("per_page", self.config.per_page.to_string()),
            ]);
        }

        let response = request.send().await.map_err(|e| transport(&e))?;
        let response = check_status(response).await?;

        let next = response
            .headers()
            .get(header::LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_url);
        let body = response.text().await.map_err(|e| transport(&e))?;
        let items: Vec<ListedIssue> = serde_json::from_str(&body).map_err(|e| PortError::Decode {
            service: Service::GitHub,
            message: format!("issue listing: {e}"),
        })?;
        Ok((items, next))
    }
}

#[async_trait]
impl IssueSource for GithubClient {
    #[instrument(skip(self), fields(repository = %repo))]
    async fn list_issues(&self, repo: &RepositoryRef) -> Result<Vec<Issue>, PortError> {
        let mut issues = Vec::new();
        let mut listed = 0usize;
        let mut pages = 0usize;
        let mut url = self.issues_url(repo);

        loop {
            let (items, next) = self.fetch_page(&url, pages == 0).await?;
            pages += 1;
            listed += items.len();
            debug!(page = pages, items = items.len(), "Fetched issue page");
            issues.extend(issues_from_listing(items));

            match next {
                Some(next) => url = next,
                None => break,
            }
        }

        info!(
            pages,
            issues = issues.len(),
            pull_requests = listed - issues.len(),
            "Listed repository issues"
        );
        Ok(issues)
    }
}

fn transport(error: &reqwest::Error) -> PortError {
    PortError::Transport {
        service: Service::GitHub,
        message: error.to_string(),
    }
}

/// Passes successful responses through and turns the rest into [`PortError`]s.
///
/// A 403 with an exhausted rate limit is a rate-limit response in GitHub's
/// dialect and is classified as retryable.
async fn check_status(response: Response) -> Result<Response, PortError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let rate_limited = status == StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|value| value.to_str().ok())
            == Some("0");

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error response".to_string());
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| json.get("message")?.as_str().map(str::to_string))
        .unwrap_or(body);

    if rate_limited {
        return Err(PortError::Status {
            service: Service::GitHub,
            status: status.as_u16(),
            message,
            retry: RetryPolicy::Retryable { after: retry_after },
        });
    }
    Err(PortError::from_status(
        Service::GitHub,
        status.as_u16(),
        message,
        retry_after,
    ))
}
