//! HTTP client for the Notion REST API.

use std::time::Duration;

use async_trait::async_trait;
use mirror::{
    entry_properties, DatabaseId, MirrorStore, PageCursor, PageId, PortError, PropertySet,
    RowPage, Service,
};
use reqwest::{header, Client as ReqwestClient, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::payload::{encode_properties, PageObject, QueryResponse};

/// Default public API root.
pub const DEFAULT_API_URL: &str = "https://api.notion.com/v1";

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Largest page size the query endpoint accepts.
const QUERY_PAGE_SIZE: u32 = 100;

/// Configuration for [`NotionClient`].
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token.
    pub token: String,
    /// API root including the version segment, without a trailing slash.
    pub api_url: String,
    pub timeout: Duration,
}

impl NotionConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// [`MirrorStore`] backed by a Notion database.
pub struct NotionClient {
    http: ReqwestClient,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self, PortError> {
        let http = ReqwestClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| transport(&e))?;
        Ok(Self { http, config })
    }

    /// Appends one row whose `title` property is `text`.
    #[instrument(skip(self, text), fields(database = %database))]
    pub async fn add_entry(&self, database: &DatabaseId, text: &str) -> Result<PageId, PortError> {
        let page = self.create_page(database, &entry_properties(text)).await?;
        info!(page = %page, "Entry added");
        Ok(page)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> Result<T, PortError> {
        let response = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&self.config.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(&e))?;
        let response = check_status(response).await?;

        let text = response.text().await.map_err(|e| transport(&e))?;
        serde_json::from_str(&text).map_err(|e| PortError::Decode {
            service: Service::Notion,
            message: format!("{path}: {e}"),
        })
    }
}

#[async_trait]
impl MirrorStore for NotionClient {
    #[instrument(skip(self, cursor), fields(database = %database))]
    async fn query_rows(
        &self,
        database: &DatabaseId,
        cursor: Option<&PageCursor>,
    ) -> Result<RowPage, PortError> {
        let mut body = json!({ "page_size": QUERY_PAGE_SIZE });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor.as_str());
        }
        let response: QueryResponse = self
            .send(Method::POST, &format!("databases/{database}/query"), &body)
            .await?;
        let page = response.into_row_page();
        debug!(rows = page.rows.len(), more = page.next_cursor.is_some(), "Queried rows");
        Ok(page)
    }

    #[instrument(skip(self, properties), fields(database = %database))]
    async fn create_page(
        &self,
        database: &DatabaseId,
        properties: &PropertySet,
    ) -> Result<PageId, PortError> {
        let body = json!({
            "parent": { "database_id": database.as_str() },
            "properties": encode_properties(properties),
        });
        let page: PageObject = self.send(Method::POST, "pages", &body).await?;
        PageId::new(page.id).ok_or_else(|| PortError::Decode {
            service: Service::Notion,
            message: "created page has an empty id".to_string(),
        })
    }

    #[instrument(skip(self, properties), fields(page = %page))]
    async fn update_page(&self, page: &PageId, properties: &PropertySet) -> Result<(), PortError> {
        let body = json!({ "properties": encode_properties(properties) });
        let _: PageObject = self
            .send(Method::PATCH, &format!("pages/{page}"), &body)
            .await?;
        Ok(())
    }
}

fn transport(error: &reqwest::Error) -> PortError {
    PortError::Transport {
        service: Service::Notion,
        message: error.to_string(),
    }
}

/// Passes successful responses through and turns the rest into [`PortError`]s,
/// keeping Notion's `code: message` error text when the body has one.
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
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error response".to_string());
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            let message = json.get("message")?.as_str()?;
            Some(match json.get("code").and_then(Value::as_str) {
                Some(code) => format!("{code}: {message}"),
                None => message.to_string(),
            })
        })
        .unwrap_or(body);

    Err(PortError::from_status(
        Service::Notion,
        status.as_u16(),
        message,
        retry_after,
    ))
}
