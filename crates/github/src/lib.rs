//! Issue mirror GitHub adapter.
//!
//! Implements the [`mirror::IssueSource`] port over the GitHub REST API
//! (`GET /repos/{owner}/{repo}/issues`).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (authentication, `Link`-header pagination, the
//! pull-request discriminator, error classification) are handled here; the
//! [`mirror`] and `engine` crates never see them.

pub mod client;
pub mod listing;

pub use client::{GithubClient, GithubConfig, DEFAULT_API_URL};
pub use listing::{issues_from_listing, next_page_url, ListedIssue};
