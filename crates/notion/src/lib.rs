//! Issue mirror Notion adapter.
//!
//! Implements the [`mirror::MirrorStore`] port over the Notion REST API:
//! database queries for the mirror index, and page creation and update for
//! the batched writes. [`NotionClient::add_entry`] appends a single free-text
//! row to a database and is used outside of the sync.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, the Notion property JSON shapes,
//! cursor handling, and error classification live here. The [`mirror`] crate
//! sees only [`mirror::MirrorStore`] and [`mirror::PropertySet`].

pub mod client;
pub mod payload;

pub use client::{NotionClient, NotionConfig, DEFAULT_API_URL, NOTION_VERSION};
