//! Notion JSON shapes for page properties and database query results.

use mirror::{properties, IssueNumber, MirrorRow, PageCursor, PageId, PropertySet, PropertyValue, RowPage};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Encodes a property set as a Notion `properties` object.
pub fn encode_properties(properties: &PropertySet) -> Value {
    let mut encoded = Map::new();
    for (name, value) in properties.iter() {
        encoded.insert(name.to_string(), encode_value(value));
    }
    Value::Object(encoded)
}

fn encode_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Title(text) => json!({
            "title": [{ "type": "text", "text": { "content": text } }]
        }),
        PropertyValue::Number(n) => json!({ "number": n }),
        PropertyValue::Select(label) => json!({ "select": { "name": label } }),
        PropertyValue::Url(url) => json!({ "url": url }),
    }
}

/// Body of `POST /databases/{id}/query`.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<PageObject>,
    /// Present while more results remain.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A page as returned by queries and page endpoints.
#[derive(Debug, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl PageObject {
    /// The integer held by the row's issue-number property, if any.
    ///
    /// Notion numbers are JSON floats; only non-negative whole values count.
    pub fn issue_number(&self) -> Option<IssueNumber> {
        let number = self.properties.get(properties::ISSUE_NUMBER)?.get("number")?;
        if let Some(n) = number.as_u64() {
            return Some(IssueNumber::new(n));
        }
        let n = number.as_f64()?;
        (n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64).then(|| IssueNumber::new(n as u64))
    }
}

impl QueryResponse {
    /// Converts the response into a page of mirror rows.
    ///
    /// Results without an id are left out of `rows` and counted in
    /// `unidentified`.
    pub fn into_row_page(self) -> RowPage {
        let mut page = RowPage {
            next_cursor: self.next_cursor.and_then(PageCursor::new),
            ..RowPage::default()
        };
        for result in self.results {
            let issue_number = result.issue_number();
            match PageId::new(result.id) {
                Some(page_id) => page.rows.push(MirrorRow {
                    page_id,
                    issue_number,
                }),
                None => page.unidentified += 1,
            }
        }
        page
    }
}
