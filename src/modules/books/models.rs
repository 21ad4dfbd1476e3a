use folio_store::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::naming::normalize;

// 10 characters (9 digits plus a digit or check character) or 13 digits,
// after hyphens and whitespace have been stripped.
static ISBN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{9}[\dXx]|\d{13})$").expect("isbn pattern is valid")
});

/// Strip the formatting characters ignored by isbn validation.
pub fn strip_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Format check on the stripped form; empty input is treated as absent.
pub fn is_valid_isbn(raw: &str) -> bool {
    let stripped = strip_isbn(raw);
    stripped.is_empty() || ISBN_RE.is_match(&stripped)
}

/// Book record.
///
/// `author_names` is free text captured at creation time, never a reference
/// to an `Author` id; the relationship to authors is evaluated at query
/// time by name matching. `author_names_lower` is the derived projection
/// used by the search fast path and may be empty on imported records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default)]
    pub id: Uuid,
    pub title: String,
    pub author_names: Vec<String>,
    #[serde(default)]
    pub author_names_lower: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
}

impl Book {
    /// Recompute the lowercase author-name projection. Returns whether the
    /// stored projection changed.
    pub fn recompute_derived(&mut self) -> bool {
        let lower: Vec<String> = self.author_names.iter().map(|n| normalize(n)).collect();
        let changed = self.author_names_lower != lower;
        self.author_names_lower = lower;
        changed
    }
}

impl Document for Book {
    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

/// Request model for creating a book.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub author_names: Vec<String>,
    #[serde(default)]
    pub publish_year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub pages: Option<u32>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    pub title: Option<String>,
    pub author_names: Option<Vec<String>>,
    pub publish_year: Option<i32>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub pages: Option<u32>,
}
