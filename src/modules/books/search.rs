//! Author-identity resolution for book retrieval.
//!
//! A free-text author-name query resolves to at most one author; that
//! author's canonical name and aliases form the variant set matched against
//! every book's author-name list.

use std::collections::HashSet;

use anyhow::Context;
use folio_store::StoreError;
use regex::{Regex, RegexBuilder};

use crate::modules::authors::store::AuthorStore;
use crate::modules::naming::normalize;

use super::models::Book;
use super::store::BookStore;

/// Retrieve the books attributed to whichever author matches `query`.
///
/// A blank query lists every book. A query matching no author yields an
/// empty list; that means "no such author", not an error. When several
/// authors match, the store's first match wins; which one that is carries
/// no guarantee.
pub fn search_books_by_author_name(
    authors: &AuthorStore,
    books: &BookStore,
    query: &str,
) -> Result<Vec<Book>, StoreError> {
    if query.trim().is_empty() {
        return Ok(books.all());
    }

    let Some(author) = authors.find_first_match(query) else {
        return Ok(Vec::new());
    };

    let variants: Vec<&str> = std::iter::once(author.current_name.as_str())
        .chain(author.aliases.iter().map(String::as_str))
        .filter(|name| !name.is_empty())
        .collect();

    let lower_variants: HashSet<String> = variants.iter().map(|name| normalize(name)).collect();
    let exact_variants = compile_exact_matchers(&variants)?;

    Ok(books.find_by_author_variants(&lower_variants, &exact_variants))
}

/// Anchored case-insensitive whole-string matchers over the original
/// variant strings. Regex metacharacters in names are escaped before
/// anchoring.
fn compile_exact_matchers(variants: &[&str]) -> Result<Vec<Regex>, StoreError> {
    variants
        .iter()
        .map(|name| {
            RegexBuilder::new(&format!("^{}$", regex::escape(name)))
                .case_insensitive(true)
                .build()
                .with_context(|| format!("failed to compile matcher for '{name}'"))
                .map_err(StoreError::Internal)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::authors::models::NewAuthor;
    use crate::modules::books::models::NewBook;
    use uuid::Uuid;

    fn seed_author(store: &AuthorStore, name: &str, aliases: &[&str]) {
        store
            .create(NewAuthor {
                current_name: name.to_string(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                birth_year: None,
                death_year: None,
                nationality: None,
                bio: None,
            })
            .unwrap();
    }

    fn seed_book(store: &BookStore, title: &str, authors: &[&str]) {
        store
            .create(NewBook {
                title: title.to_string(),
                author_names: authors.iter().map(|a| a.to_string()).collect(),
                publish_year: None,
                isbn: None,
                genre: None,
                pages: None,
            })
            .unwrap();
    }

    #[test]
    fn blank_query_lists_every_book() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_book(&books, "One", &["A"]);
        seed_book(&books, "Two", &["B"]);

        let found = search_books_by_author_name(&authors, &books, "  ").unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn unknown_author_is_an_empty_result_not_an_error() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_author(&authors, "Someone Else", &[]);
        seed_book(&books, "One", &["Someone Else"]);

        let found = search_books_by_author_name(&authors, &books, "nobody").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn matching_author_with_no_books_is_empty() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_author(&authors, "Quiet Writer", &[]);

        let found = search_books_by_author_name(&authors, &books, "quiet").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn resolves_via_alias_variants() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_author(&authors, "Bob McTesterson", &["Robert M. Tester"]);
        seed_book(&books, "Widgets", &["Robert M. Tester"]);
        seed_book(&books, "Unrelated", &["Someone Else"]);

        // "bob" substring-matches the canonical name; the alias variant
        // reaches the book.
        let found = search_books_by_author_name(&authors, &books, "bob").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Widgets");
    }

    #[test]
    fn fallback_reaches_books_without_projection() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_author(&authors, "Bob McTesterson", &["Robert M. Tester"]);

        // Imported record: differently-cased author string, no projection.
        books.import(vec![crate::modules::books::models::Book {
            id: Uuid::nil(),
            title: "Widgets".to_string(),
            author_names: vec!["ROBERT M. TESTER".to_string()],
            author_names_lower: Vec::new(),
            publish_year: None,
            isbn: None,
            genre: None,
            pages: None,
        }]);

        let found = search_books_by_author_name(&authors, &books, "bob").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Widgets");
    }

    #[test]
    fn fast_path_matches_projected_records() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_author(&authors, "Bob McTesterson", &["Robert M. Tester"]);
        seed_book(&books, "Widgets", &["robert m. tester"]);

        let found = search_books_by_author_name(&authors, &books, "mctester").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn names_with_regex_metacharacters_are_escaped() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_author(&authors, "A. C. (Sandy) Doyle*", &[]);

        // The parenthesized name must not match a book by some other
        // author, and must match itself exactly.
        books.import(vec![crate::modules::books::models::Book {
            id: Uuid::nil(),
            title: "Cases".to_string(),
            author_names: vec!["a. c. (sandy) doyle*".to_string()],
            author_names_lower: Vec::new(),
            publish_year: None,
            isbn: None,
            genre: None,
            pages: None,
        }]);
        seed_book(&books, "Decoy", &["A C X SandyX Doyle"]);

        let found = search_books_by_author_name(&authors, &books, "sandy").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Cases");
    }

    #[test]
    fn empty_alias_contributes_no_variant() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_author(&authors, "Named Author", &[""]);
        seed_book(&books, "Book", &["Named Author"]);

        let found = search_books_by_author_name(&authors, &books, "named").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn multiple_matches_take_the_stores_first() {
        let authors = AuthorStore::new();
        let books = BookStore::new();
        seed_author(&authors, "Ann Early", &[]);
        seed_author(&authors, "Ann Late", &[]);
        seed_book(&books, "Early Work", &["Ann Early"]);
        seed_book(&books, "Late Work", &["Ann Late"]);

        // v7 ids order by insertion, so the first created author wins.
        let found = search_books_by_author_name(&authors, &books, "ann").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Early Work");
    }
}
