pub mod authors;
pub mod books;
pub mod naming;

use std::sync::Arc;

use folio_kernel::ModuleRegistry;

use authors::store::AuthorStore;
use books::store::BookStore;

/// Register the catalog modules with the registry.
pub fn register_all(
    registry: &mut ModuleRegistry,
    authors: Arc<AuthorStore>,
    books: Arc<BookStore>,
) {
    registry.register(authors::create_module(authors.clone()));
    registry.register(books::create_module(books, authors));
}
