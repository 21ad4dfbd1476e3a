use folio_store::{Collection, StoreError};
use uuid::Uuid;

use super::models::{Author, AuthorPatch, NewAuthor};
use crate::modules::naming::normalize;

/// Author identity store.
///
/// Lookup by free-text query is a case-insensitive substring match against
/// the canonical name and aliases; the lowercase projections are maintained
/// for the book search fast path, not for this lookup.
pub struct AuthorStore {
    authors: Collection<Author>,
}

impl AuthorStore {
    pub fn new() -> Self {
        Self {
            authors: Collection::new(),
        }
    }

    pub fn create(&self, new: NewAuthor) -> Result<Author, StoreError> {
        if new.current_name.trim().is_empty() {
            return Err(StoreError::validation("currentName is required"));
        }

        let mut author = Author {
            id: Uuid::nil(),
            current_name: new.current_name,
            current_name_lower: String::new(),
            aliases: new.aliases,
            aliases_lower: Vec::new(),
            birth_year: new.birth_year,
            death_year: new.death_year,
            nationality: new.nationality,
            bio: new.bio,
        };
        author.recompute_derived();

        Ok(self.authors.insert(author))
    }

    pub fn get(&self, id: Uuid) -> Result<Author, StoreError> {
        self.authors
            .get(id)
            .ok_or_else(|| StoreError::not_found("Author"))
    }

    /// Blank query returns every author; otherwise a case-insensitive
    /// substring match on the canonical name or any alias, in natural key
    /// order. The query is matched as given, whitespace included.
    pub fn search(&self, query: &str) -> Vec<Author> {
        if query.trim().is_empty() {
            return self.authors.all();
        }
        let query_lower = normalize(query);
        self.authors.find(|a| a.matches_query(&query_lower))
    }

    /// First author matching the substring policy, in natural key order.
    /// Which author wins when several match is an explicit non-guarantee.
    pub fn find_first_match(&self, query: &str) -> Option<Author> {
        if query.trim().is_empty() {
            return None;
        }
        let query_lower = normalize(query);
        self.authors.find_first(|a| a.matches_query(&query_lower))
    }

    pub fn update(&self, id: Uuid, patch: AuthorPatch) -> Result<Author, StoreError> {
        let updated = self.authors.update(id, |current| {
            let mut author = current.clone();
            let mut names_touched = false;

            if let Some(name) = patch.current_name {
                if name.trim().is_empty() {
                    return Err(StoreError::validation("currentName must not be empty"));
                }
                author.current_name = name;
                names_touched = true;
            }
            if let Some(aliases) = patch.aliases {
                author.aliases = aliases;
                names_touched = true;
            }
            if let Some(year) = patch.birth_year {
                author.birth_year = Some(year);
            }
            if let Some(year) = patch.death_year {
                author.death_year = Some(year);
            }
            if let Some(nationality) = patch.nationality {
                author.nationality = Some(nationality);
            }
            if let Some(bio) = patch.bio {
                author.bio = Some(bio);
            }

            if names_touched {
                author.recompute_derived();
            }
            Ok(author)
        })?;

        updated.ok_or_else(|| StoreError::not_found("Author"))
    }

    /// Delete is not idempotent: a repeat delete of the same id is NotFound.
    pub fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.authors
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Author"))
    }

    /// Insert records as-is, keeping whatever projections (or lack of them)
    /// they arrived with. Used for pre-existing datasets.
    pub fn import(&self, records: Vec<Author>) -> usize {
        let count = records.len();
        for record in records {
            self.authors.insert(record);
        }
        count
    }

    /// Recompute the lowercase projections over every record. Idempotent.
    pub fn backfill(&self) -> usize {
        self.authors.update_each(|author| author.recompute_derived())
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl Default for AuthorStore {
    fn default() -> Self {
        Self::new()
    }
}
