use std::collections::HashSet;

use folio_store::{Collection, StoreError};
use regex::Regex;
use uuid::Uuid;

use super::models::{is_valid_isbn, strip_isbn, Book, BookPatch, NewBook};

/// Book store.
///
/// Author-variant retrieval is dual-path: membership of the derived
/// lowercase projection is the fast path, and an anchored case-insensitive
/// regex over the original strings is the correctness fallback for records
/// whose projection is stale or missing.
pub struct BookStore {
    books: Collection<Book>,
}

impl BookStore {
    pub fn new() -> Self {
        Self {
            books: Collection::new(),
        }
    }

    fn validate_descriptive(
        publish_year: Option<i32>,
        pages: Option<u32>,
    ) -> Result<(), StoreError> {
        if matches!(publish_year, Some(year) if year < 0) {
            return Err(StoreError::validation("publishYear must not be negative"));
        }
        if matches!(pages, Some(0)) {
            return Err(StoreError::validation("pages must be at least 1"));
        }
        Ok(())
    }

    pub fn create(&self, new: NewBook) -> Result<Book, StoreError> {
        if new.title.trim().is_empty() {
            return Err(StoreError::validation("title is required"));
        }
        if new.author_names.is_empty() {
            return Err(StoreError::validation(
                "authorNames must be a non-empty array of strings",
            ));
        }
        Self::validate_descriptive(new.publish_year, new.pages)?;

        let isbn = new.isbn.filter(|raw| !strip_isbn(raw).is_empty());
        if let Some(raw) = &isbn {
            if !is_valid_isbn(raw) {
                return Err(StoreError::validation(format!(
                    "{raw} is not a valid ISBN (10 or 13 digits, hyphens allowed)"
                )));
            }
        }

        let mut book = Book {
            id: Uuid::nil(),
            title: new.title,
            author_names: new.author_names,
            author_names_lower: Vec::new(),
            publish_year: new.publish_year,
            isbn,
            genre: new.genre,
            pages: new.pages,
        };
        book.recompute_derived();

        // Uniqueness is checked on the stripped digit form, under the same
        // write lock as the insert.
        let stripped = book.isbn.as_deref().map(strip_isbn);
        self.books.insert_guarded(book, |existing| {
            isbn_conflict(stripped.as_deref(), existing)
        })
    }

    pub fn get(&self, id: Uuid) -> Result<Book, StoreError> {
        self.books
            .get(id)
            .ok_or_else(|| StoreError::not_found("Book"))
    }

    pub fn update(&self, id: Uuid, patch: BookPatch) -> Result<Book, StoreError> {
        let new_isbn = match &patch.isbn {
            Some(raw) if !strip_isbn(raw).is_empty() => {
                if !is_valid_isbn(raw) {
                    return Err(StoreError::validation(format!(
                        "{raw} is not a valid ISBN (10 or 13 digits, hyphens allowed)"
                    )));
                }
                Some(raw.clone())
            }
            _ => None,
        };
        let stripped = new_isbn.as_deref().map(strip_isbn);

        let updated = self.books.update_guarded(
            id,
            |current| {
                let mut book = current.clone();
                let mut names_touched = false;

                if let Some(title) = patch.title {
                    if title.trim().is_empty() {
                        return Err(StoreError::validation("title must not be empty"));
                    }
                    book.title = title;
                }
                if let Some(author_names) = patch.author_names {
                    if author_names.is_empty() {
                        return Err(StoreError::validation(
                            "authorNames must be a non-empty array of strings",
                        ));
                    }
                    book.author_names = author_names;
                    names_touched = true;
                }
                if let Some(year) = patch.publish_year {
                    book.publish_year = Some(year);
                }
                if let Some(isbn) = new_isbn {
                    book.isbn = Some(isbn);
                }
                if let Some(genre) = patch.genre {
                    book.genre = Some(genre);
                }
                if let Some(pages) = patch.pages {
                    book.pages = Some(pages);
                }

                Self::validate_descriptive(book.publish_year, book.pages)?;
                if names_touched {
                    book.recompute_derived();
                }
                Ok(book)
            },
            |other| isbn_conflict(stripped.as_deref(), other),
        )?;

        updated.ok_or_else(|| StoreError::not_found("Book"))
    }

    /// Delete is not idempotent: a repeat delete of the same id is NotFound.
    pub fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.books
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Book"))
    }

    pub fn all(&self) -> Vec<Book> {
        self.books.all()
    }

    /// Case-insensitive substring match on the title.
    pub fn find_by_title(&self, query: &str) -> Vec<Book> {
        let query_lower = query.to_lowercase();
        self.books
            .find(|b| b.title.to_lowercase().contains(&query_lower))
    }

    /// Books whose author-name list intersects the resolved variant set.
    ///
    /// A single scan evaluates both paths, so the union is deduplicated by
    /// id and returned in natural key order.
    pub fn find_by_author_variants(
        &self,
        lower_variants: &HashSet<String>,
        exact_variants: &[Regex],
    ) -> Vec<Book> {
        self.books.find(|book| {
            book.author_names_lower
                .iter()
                .any(|name| lower_variants.contains(name.as_str()))
                || book
                    .author_names
                    .iter()
                    .any(|name| exact_variants.iter().any(|re| re.is_match(name)))
        })
    }

    /// Insert records as-is, keeping whatever projections (or lack of them)
    /// they arrived with. Used for pre-existing datasets.
    pub fn import(&self, records: Vec<Book>) -> usize {
        let count = records.len();
        for record in records {
            self.books.insert(record);
        }
        count
    }

    /// Recompute the lowercase projections over every record. Idempotent.
    pub fn backfill(&self) -> usize {
        self.books.update_each(|book| book.recompute_derived())
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}

fn isbn_conflict(stripped: Option<&str>, existing: &Book) -> Option<String> {
    let candidate = stripped?;
    let other = existing.isbn.as_deref()?;
    if strip_isbn(other) == candidate {
        Some(format!("isbn '{candidate}' is already in use"))
    } else {
        None
    }
}
