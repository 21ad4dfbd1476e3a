use folio_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::naming::normalize;

/// Author identity record.
///
/// `current_name_lower` and `aliases_lower` are derived projections,
/// recomputed on every successful write. Records imported from an older
/// dataset may carry empty projections; reads tolerate that through the
/// search fallback rather than repairing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub id: Uuid,
    pub current_name: String,
    #[serde(default)]
    pub current_name_lower: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub aliases_lower: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Author {
    /// Recompute the lowercase projections from the source fields.
    /// Returns whether anything changed, so backfills can report counts.
    pub fn recompute_derived(&mut self) -> bool {
        let name_lower = normalize(&self.current_name);
        let aliases_lower: Vec<String> = self.aliases.iter().map(|a| normalize(a)).collect();

        let changed = self.current_name_lower != name_lower || self.aliases_lower != aliases_lower;
        self.current_name_lower = name_lower;
        self.aliases_lower = aliases_lower;
        changed
    }

    /// True when `query` is a case-insensitive substring of the canonical
    /// name or any alias. This is the lookup policy for the identity store;
    /// book resolution uses exact matching instead.
    pub fn matches_query(&self, query_lower: &str) -> bool {
        normalize(&self.current_name).contains(query_lower)
            || self
                .aliases
                .iter()
                .any(|alias| normalize(alias).contains(query_lower))
    }
}

impl Document for Author {
    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

/// Request model for creating an author.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    pub current_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPatch {
    pub current_name: Option<String>,
    pub aliases: Option<Vec<String>>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub nationality: Option<String>,
    pub bio: Option<String>,
}
