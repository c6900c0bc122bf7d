//! Tests for the Notion mirror store against a mock HTTP server.

use mirror::{
    issue_properties, DatabaseId, Issue, IssueNumber, IssueState, MirrorStore, PageCursor, PageId,
    PortError,
};
use mockito::{Matcher, Server};
use notion::{NotionClient, NotionConfig};
use serde_json::json;

fn client(server: &Server) -> NotionClient {
    let mut config = NotionConfig::new("secret_test");
    config.api_url = server.url();
    NotionClient::new(config).expect("client")
}

fn database() -> DatabaseId {
    DatabaseId::new("db123").unwrap()
}

fn issue() -> Issue {
    Issue {
        number: IssueNumber::new(42),
        title: "Fix bug".into(),
        state: IssueState::Open,
        comment_count: 3,
        url: "https://x/42".into(),
    }
}

#[tokio::test]
async fn query_sends_cursor_only_when_present() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", "/databases/db123/query")
        .match_header("authorization", "Bearer secret_test")
        .match_header("notion-version", "2022-06-28")
        .match_body(Matcher::Json(json!({ "page_size": 100 })))
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "results": [
                    { "id": "row_abc", "properties": { "Issue Number": { "type": "number", "number": 42 } } }
                ],
                "next_cursor": "cur-2",
                "has_more": true
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("POST", "/databases/db123/query")
        .match_body(Matcher::Json(json!({ "page_size": 100, "start_cursor": "cur-2" })))
        .with_status(200)
        .with_body(json!({ "results": [], "next_cursor": null, "has_more": false }).to_string())
        .create_async()
        .await;

    let store = client(&server);
    let page = store.query_rows(&database(), None).await.expect("first page");
    let cursor = page.next_cursor.clone().expect("cursor");
    let last = store
        .query_rows(&database(), Some(&cursor))
        .await
        .expect("second page");

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].page_id.as_str(), "row_abc");
    assert_eq!(page.rows[0].issue_number, Some(IssueNumber::new(42)));
    assert_eq!(cursor, PageCursor::new("cur-2").unwrap());
    assert!(last.rows.is_empty());
    assert!(last.next_cursor.is_none());
}

#[tokio::test]
async fn create_posts_parent_and_all_properties() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/pages")
        .match_body(Matcher::Json(json!({
            "parent": { "database_id": "db123" },
            "properties": {
                "Name": { "title": [{ "type": "text", "text": { "content": "Fix bug" } }] },
                "Issue Number": { "number": 42 },
                "State": { "select": { "name": "open" } },
                "Number of Comments": { "number": 3 },
                "Issue URL": { "url": "https://x/42" }
            }
        })))
        .with_status(200)
        .with_body(json!({ "object": "page", "id": "new_page" }).to_string())
        .create_async()
        .await;

    let page = client(&server)
        .create_page(&database(), &issue_properties(&issue()))
        .await
        .expect("create");

    mock.assert_async().await;
    assert_eq!(page.as_str(), "new_page");
}

#[tokio::test]
async fn update_patches_the_page() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/pages/row_abc")
        .match_body(Matcher::PartialJson(json!({
            "properties": { "State": { "select": { "name": "closed" } } }
        })))
        .with_status(200)
        .with_body(json!({ "object": "page", "id": "row_abc" }).to_string())
        .create_async()
        .await;

    let mut closed = issue();
    closed.state = IssueState::Closed;
    client(&server)
        .update_page(&PageId::new("row_abc").unwrap(), &issue_properties(&closed))
        .await
        .expect("update");

    mock.assert_async().await;
}

#[tokio::test]
async fn add_entry_creates_a_title_only_row() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/pages")
        .match_body(Matcher::Json(json!({
            "parent": { "database_id": "qa_db" },
            "properties": {
                "title": { "title": [{ "type": "text", "text": { "content": "Yurts in Big Sur, California" } }] }
            }
        })))
        .with_status(200)
        .with_body(json!({ "object": "page", "id": "entry_1" }).to_string())
        .create_async()
        .await;

    let page = client(&server)
        .add_entry(&DatabaseId::new("qa_db").unwrap(), "Yurts in Big Sur, California")
        .await
        .expect("entry");

    mock.assert_async().await;
    assert_eq!(page.as_str(), "entry_1");
}

#[tokio::test]
async fn validation_error_keeps_code_and_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/pages")
        .with_status(400)
        .with_body(
            json!({
                "object": "error",
                "status": 400,
                "code": "validation_error",
                "message": "State is not a property that exists."
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client(&server)
        .create_page(&database(), &issue_properties(&issue()))
        .await
        .unwrap_err();

    match err {
        PortError::Status { status, message, .. } => {
            assert_eq!(status, 400);
            assert_eq!(message, "validation_error: State is not a property that exists.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn rate_limited_write_is_retryable() {
    let mut server = Server::new_async().await;
    server
        .mock("PATCH", "/pages/row_abc")
        .with_status(429)
        .with_header("retry-after", "2")
        .with_body(json!({ "object": "error", "code": "rate_limited", "message": "slow down" }).to_string())
        .create_async()
        .await;

    let err = client(&server)
        .update_page(&PageId::new("row_abc").unwrap(), &issue_properties(&issue()))
        .await
        .unwrap_err();

    assert_eq!(
        err.retry_policy(),
        mirror::RetryPolicy::Retryable {
            after: Some(std::time::Duration::from_secs(2))
        }
    );
}

#[tokio::test]
async fn invalid_token_is_unauthorized() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/databases/db123/query")
        .with_status(401)
        .with_body(json!({ "object": "error", "code": "unauthorized", "message": "API token is invalid." }).to_string())
        .create_async()
        .await;

    let err = client(&server).query_rows(&database(), None).await.unwrap_err();

    assert!(matches!(err, PortError::Unauthorized { status: 401, .. }));
}
