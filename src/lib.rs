//! FOLIO Application Library
//!
//! Catalog service over authors and books: CRUD stores, author-identity
//! resolution, and the denormalized name search.

pub mod dataset;
pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use folio_kernel::settings::Settings;
use folio_kernel::{InitCtx, ModuleRegistry};

use modules::authors::store::AuthorStore;
use modules::books::store::BookStore;

/// Bootstrap the catalog service and serve until shutdown.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let authors = Arc::new(AuthorStore::new());
    let books = Arc::new(BookStore::new());

    if let Some(path) = &settings.store.dataset_path {
        let loaded = dataset::load(path)
            .with_context(|| format!("failed to load dataset from {}", path.display()))?;
        let author_count = authors.import(loaded.authors);
        let book_count = books.import(loaded.books);
        tracing::info!(
            dataset = %path.display(),
            authors = author_count,
            books = book_count,
            "dataset imported"
        );
    }

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, authors, books);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    folio_http::start_server(&registry, &settings).await?;

    registry.stop_all().await?;
    Ok(())
}
