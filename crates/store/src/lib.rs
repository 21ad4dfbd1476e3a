//! In-memory document collections for FOLIO.
//!
//! Each [`Collection`] is a UUID-keyed ordered map behind an `RwLock`; a
//! single lock acquisition per operation is the only atomicity guarantee.
//! There are no cross-collection transactions.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use thiserror::Error;
use uuid::{ContextV7, Uuid};

/// Typed outcomes surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid id '{0}'")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

/// Parse an externally supplied identifier.
///
/// A malformed string is a caller error (`InvalidId`), distinct from a
/// well-formed id that matches no record (`NotFound`).
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

static ID_CONTEXT: Lazy<Mutex<ContextV7>> = Lazy::new(|| Mutex::new(ContextV7::new()));

/// Generate a fresh document id (UUID v7).
///
/// A shared context keeps ids monotonic even within one millisecond, so
/// collection key order tracks creation order.
pub fn next_id() -> Uuid {
    let context = ID_CONTEXT.lock().unwrap_or_else(PoisonError::into_inner);
    Uuid::new_v7(uuid::Timestamp::now(&*context))
}

/// Documents stored in a [`Collection`] carry their own id.
pub trait Document: Clone + Send + Sync {
    fn id(&self) -> Uuid;
    fn assign_id(&mut self, id: Uuid);
}

/// UUID-keyed in-memory collection.
///
/// Scan order is the natural key order of the map; with v7 ids that is
/// roughly insertion order, but callers must not rely on it as a ranking.
pub struct Collection<T> {
    docs: RwLock<BTreeMap<Uuid, T>>,
}

impl<T: Document> Collection<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Uuid, T>> {
        self.docs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Uuid, T>> {
        self.docs.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a document, assigning a fresh id when the document has none.
    pub fn insert(&self, mut doc: T) -> T {
        let mut docs = self.write();
        if doc.id().is_nil() {
            doc.assign_id(next_id());
        }
        docs.insert(doc.id(), doc.clone());
        doc
    }

    /// Insert after checking every existing document with `guard`, all under
    /// one write lock. `guard` returning a message aborts with `Conflict`.
    pub fn insert_guarded<F>(&self, mut doc: T, guard: F) -> Result<T, StoreError>
    where
        F: Fn(&T) -> Option<String>,
    {
        let mut docs = self.write();
        for existing in docs.values() {
            if let Some(message) = guard(existing) {
                return Err(StoreError::Conflict(message));
            }
        }
        if doc.id().is_nil() {
            doc.assign_id(next_id());
        }
        docs.insert(doc.id(), doc.clone());
        Ok(doc)
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.read().get(&id).cloned()
    }

    /// Replace the document with `id` by the result of `apply`, checking all
    /// other documents with `guard` under the same write lock.
    pub fn update_guarded<A, F>(&self, id: Uuid, apply: A, guard: F) -> Result<Option<T>, StoreError>
    where
        A: FnOnce(&T) -> Result<T, StoreError>,
        F: Fn(&T) -> Option<String>,
    {
        let mut docs = self.write();
        let Some(current) = docs.get(&id) else {
            return Ok(None);
        };
        let mut updated = apply(current)?;
        for (other_id, other) in docs.iter() {
            if *other_id == id {
                continue;
            }
            if let Some(message) = guard(other) {
                return Err(StoreError::Conflict(message));
            }
        }
        updated.assign_id(id);
        docs.insert(id, updated.clone());
        Ok(Some(updated))
    }

    pub fn update<A>(&self, id: Uuid, apply: A) -> Result<Option<T>, StoreError>
    where
        A: FnOnce(&T) -> Result<T, StoreError>,
    {
        self.update_guarded(id, apply, |_| None)
    }

    pub fn remove(&self, id: Uuid) -> Option<T> {
        self.write().remove(&id)
    }

    /// All documents matching `pred`, in natural key order.
    pub fn find<P>(&self, pred: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.read().values().filter(|doc| pred(doc)).cloned().collect()
    }

    /// First document matching `pred` in natural key order.
    pub fn find_first<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.read().values().find(|doc| pred(doc)).cloned()
    }

    pub fn all(&self) -> Vec<T> {
        self.read().values().cloned().collect()
    }

    /// Apply `f` to every document in place, returning how many changed.
    /// Used by derived-field backfills; safe to run repeatedly.
    pub fn update_each<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut docs = self.write();
        let mut changed = 0;
        for doc in docs.values_mut() {
            if f(doc) {
                changed += 1;
            }
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<T: Document> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Uuid,
        text: String,
    }

    impl Document for Note {
        fn id(&self) -> Uuid {
            self.id
        }

        fn assign_id(&mut self, id: Uuid) {
            self.id = id;
        }
    }

    fn note(text: &str) -> Note {
        Note {
            id: Uuid::nil(),
            text: text.to_string(),
        }
    }

    #[test]
    fn insert_assigns_an_id() {
        let notes = Collection::new();
        let stored = notes.insert(note("a"));
        assert!(!stored.id().is_nil());
        assert_eq!(notes.get(stored.id()), Some(stored));
    }

    #[test]
    fn insert_guarded_rejects_on_conflict() {
        let notes = Collection::new();
        notes.insert(note("a"));
        let result = notes.insert_guarded(note("a"), |existing| {
            (existing.text == "a").then(|| "duplicate text".to_string())
        });
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn update_returns_none_for_missing_doc() {
        let notes: Collection<Note> = Collection::new();
        let result = notes.update(next_id(), |n| Ok(n.clone()));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn update_guarded_skips_the_document_itself() {
        let notes = Collection::new();
        let stored = notes.insert(note("a"));
        let updated = notes
            .update_guarded(
                stored.id(),
                |n| {
                    let mut n = n.clone();
                    n.text = "a".to_string();
                    Ok(n)
                },
                |other| (other.text == "a").then(|| "duplicate text".to_string()),
            )
            .expect("no conflict against itself");
        assert!(updated.is_some());
    }

    #[test]
    fn remove_then_get_is_none() {
        let notes = Collection::new();
        let stored = notes.insert(note("a"));
        assert!(notes.remove(stored.id()).is_some());
        assert!(notes.get(stored.id()).is_none());
        assert!(notes.remove(stored.id()).is_none());
    }

    #[test]
    fn find_first_respects_key_order() {
        let notes = Collection::new();
        let first = notes.insert(note("x"));
        notes.insert(note("x"));
        let found = notes.find_first(|n| n.text == "x").map(|n| n.id());
        assert_eq!(found, Some(first.id()));
    }

    #[test]
    fn update_each_reports_changes() {
        let notes = Collection::new();
        notes.insert(note("a"));
        notes.insert(note("b"));
        let changed = notes.update_each(|n| {
            if n.text == "a" {
                n.text = "z".to_string();
                true
            } else {
                false
            }
        });
        assert_eq!(changed, 1);
        // A second pass finds nothing left to change.
        let changed = notes.update_each(|n| {
            if n.text == "a" {
                n.text = "z".to_string();
                true
            } else {
                false
            }
        });
        assert_eq!(changed, 0);
    }

    #[test]
    fn parse_id_distinguishes_malformed_from_missing() {
        assert!(matches!(parse_id("not-a-uuid"), Err(StoreError::InvalidId(_))));
        let well_formed = next_id().to_string();
        assert!(parse_id(&well_formed).is_ok());
    }
}
