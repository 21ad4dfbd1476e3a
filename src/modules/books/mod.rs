pub mod models;
pub mod search;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use folio_http::error::AppError;
use folio_kernel::{InitCtx, Module};
use serde::Deserialize;
use serde_json::json;

use crate::modules::authors::store::AuthorStore;
use models::{Book, BookPatch, NewBook};
use store::BookStore;

/// Shared state for book routes. Author resolution needs the identity
/// store alongside the books themselves.
#[derive(Clone)]
pub struct BooksState {
    pub books: Arc<BookStore>,
    pub authors: Arc<AuthorStore>,
}

/// Books module: catalog records retrieved by title or resolved author.
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(books: Arc<BookStore>, authors: Arc<AuthorStore>) -> Self {
        Self {
            state: BooksState { books, authors },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let backfilled = self.state.books.backfill();
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            records = self.state.books.len(),
            backfilled,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books).post(create_book))
            .route("/{id}", get(get_book).put(update_book).delete(delete_book))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books, filtered by title substring or resolved author name",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "q",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string" },
                                "description": "Case-insensitive title substring; ignored when authorName is present"
                            },
                            {
                                "name": "authorName",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string" },
                                "description": "Free-text author name resolved against canonical names and aliases"
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Matching books; empty when no author matches",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "responses": {
                            "201": { "description": "Created book" },
                            "409": {
                                "description": "Duplicate isbn",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "422": {
                                "description": "Validation error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Book" },
                            "400": { "description": "Malformed id" },
                            "404": { "description": "Book not found" }
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "Updated book" },
                            "404": { "description": "Book not found" }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": { "description": "Book not found" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Unique identifier" },
                            "title": { "type": "string" },
                            "authorNames": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Author names as written at creation time; not references"
                            },
                            "authorNamesLower": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Derived lowercase projection"
                            },
                            "publishYear": { "type": "integer" },
                            "isbn": { "type": "string", "description": "10 or 13 digits, hyphens allowed; unique when present" },
                            "genre": { "type": "string" },
                            "pages": { "type": "integer" }
                        },
                        "required": ["id", "title", "authorNames"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
}

/// Only one filter branch is evaluated: a non-blank `authorName` takes
/// precedence and the title filter is ignored for that request.
async fn list_books(
    State(state): State<BooksState>,
    Query(params): Query<BookQuery>,
) -> Result<Json<Vec<Book>>, AppError> {
    if let Some(author_name) = params.author_name.as_deref() {
        if !author_name.trim().is_empty() {
            let found =
                search::search_books_by_author_name(&state.authors, &state.books, author_name)?;
            return Ok(Json(found));
        }
    }

    if let Some(q) = params.q.as_deref() {
        if !q.is_empty() {
            return Ok(Json(state.books.find_by_title(q)));
        }
    }

    Ok(Json(state.books.all()))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = folio_store::parse_id(&id)?;
    Ok(Json(state.books.get(id)?))
}

async fn create_book(
    State(state): State<BooksState>,
    Json(body): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = state.books.create(body)?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    Json(body): Json<BookPatch>,
) -> Result<Json<Book>, AppError> {
    let id = folio_store::parse_id(&id)?;
    Ok(Json(state.books.update(id, body)?))
}

async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = folio_store::parse_id(&id)?;
    state.books.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a new instance of the books module
pub fn create_module(books: Arc<BookStore>, authors: Arc<AuthorStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(books, authors))
}
