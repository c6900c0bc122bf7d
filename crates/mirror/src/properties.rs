//! Field mapping from issues to mirror-database properties.
//!
//! The mapping is total: every issue produces exactly the five properties of
//! the mirror schema, in schema order. Transport encoding (the Notion JSON
//! shape) is left to the adapter; this module only decides names and typed
//! values.

use serde::{Deserialize, Serialize};

use crate::Issue;

/// Title property of the mirror schema.
pub const NAME: &str = "Name";
/// Numeric property holding the issue number; the index join key.
pub const ISSUE_NUMBER: &str = "Issue Number";
/// Single-select property whose label is the issue state.
pub const STATE: &str = "State";
pub const COMMENT_COUNT: &str = "Number of Comments";
pub const ISSUE_URL: &str = "Issue URL";

/// Title property of a free-text entry database.
pub const ENTRY_TITLE: &str = "title";

/// Typed value of one database property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Rich-text title made of a single plain text run.
    Title(String),
    Number(u64),
    /// Single-choice selection identified by its label.
    Select(String),
    Url(String),
}

/// Ordered set of named property values for one page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertySet(Vec<(String, PropertyValue)>);

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property, replacing any earlier value with the same name.
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        let name = name.into();
        self.0.retain(|(existing, _)| *existing != name);
        self.0.push((name, value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Maps one issue onto the mirror schema.
///
/// Used for both creates and updates; updates always rewrite all five
/// properties.
pub fn issue_properties(issue: &Issue) -> PropertySet {
    PropertySet::new()
        .with(NAME, PropertyValue::Title(issue.title.clone()))
        .with(ISSUE_NUMBER, PropertyValue::Number(issue.number.as_u64()))
        .with(STATE, PropertyValue::Select(issue.state.as_str().to_string()))
        .with(COMMENT_COUNT, PropertyValue::Number(issue.comment_count))
        .with(ISSUE_URL, PropertyValue::Url(issue.url.clone()))
}

/// Maps a single line of text onto an entry database's title property.
pub fn entry_properties(text: &str) -> PropertySet {
    PropertySet::new().with(ENTRY_TITLE, PropertyValue::Title(text.to_string()))
}
