//! Decoding of the repository issue listing.
//!
//! The issues endpoint lists pull requests too; they are recognisable only by
//! the `pull_request` member GitHub attaches to them.

use mirror::{Issue, IssueNumber, IssueState};
use serde::Deserialize;

/// One item of `GET /repos/{owner}/{repo}/issues`, reduced to the fields the
/// mirror uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedIssue {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub comments: u64,
    pub html_url: String,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl ListedIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    fn into_issue(self) -> Issue {
        Issue {
            number: IssueNumber::new(self.number),
            title: self.title,
            state: self.state,
            comment_count: self.comments,
            url: self.html_url,
        }
    }
}

/// Converts a raw listing into issues, dropping pull requests and keeping the
/// listing order.
pub fn issues_from_listing(items: impl IntoIterator<Item = ListedIssue>) -> Vec<Issue> {
    items
        .into_iter()
        .filter(|item| !item.is_pull_request())
        .map(ListedIssue::into_issue)
        .collect()
}

/// Extracts the `rel="next"` target from a `Link` response header.
pub fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        let is_next = parts.any(|param| {
            let Some((key, value)) = param.split_once('=') else {
                return false;
            };
            key.trim().eq_ignore_ascii_case("rel")
                && value
                    .trim()
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|rel| rel == "next")
        });
        is_next.then(|| url.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(json: serde_json::Value) -> Vec<ListedIssue> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn pull_requests_are_excluded() {
        let items = listing(serde_json::json!([
            {"number": 1, "title": "bug", "state": "open", "comments": 2,
             "html_url": "https://github.com/o/r/issues/1"},
            {"number": 2, "title": "fix", "state": "closed", "comments": 0,
             "html_url": "https://github.com/o/r/pull/2",
             "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/2"}},
            {"number": 3, "title": "idea", "state": "closed", "comments": 7,
             "html_url": "https://github.com/o/r/issues/3", "pull_request": null}
        ]));

        let issues = issues_from_listing(items);

        let numbers: Vec<u64> = issues.iter().map(|i| i.number.as_u64()).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(issues[0].comment_count, 2);
        assert_eq!(issues[0].url, "https://github.com/o/r/issues/1");
        assert_eq!(issues[1].state, IssueState::Closed);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let items = listing(serde_json::json!([
            {"number": 5, "title": "t", "state": "open", "comments": 0,
             "html_url": "u", "labels": [], "user": {"login": "octocat"}}
        ]));
        assert_eq!(issues_from_listing(items).len(), 1);
    }

    #[test]
    fn next_link_is_found_among_others() {
        let header = r#"<https://api.github.com/repositories/1/issues?page=1>; rel="prev", <https://api.github.com/repositories/1/issues?page=3>; rel="next", <https://api.github.com/repositories/1/issues?page=5>; rel="last""#;
        assert_eq!(
            next_page_url(header).as_deref(),
            Some("https://api.github.com/repositories/1/issues?page=3")
        );
    }

    #[test]
    fn last_page_has_no_next_link() {
        let header = r#"<https://api.github.com/x?page=1>; rel="first", <https://api.github.com/x?page=4>; rel="prev""#;
        assert_eq!(next_page_url(header), None);
        assert_eq!(next_page_url(""), None);
    }
}
