pub mod models;
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

use models::{Author, AuthorPatch, NewAuthor};
use store::AuthorStore;

/// Authors module: identity records with canonical name and aliases.
pub struct AuthorsModule {
    store: Arc<AuthorStore>,
}

impl AuthorsModule {
    pub fn new(store: Arc<AuthorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let backfilled = self.store.backfill();
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            records = self.store.len(),
            backfilled,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_authors).post(create_author))
            .route(
                "/{id}",
                get(get_author).put(update_author).delete(delete_author),
            )
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors, optionally filtered by a name substring",
                        "tags": ["Authors"],
                        "parameters": [
                            {
                                "name": "q",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string" },
                                "description": "Case-insensitive substring matched against currentName and aliases"
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Matching authors",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "responses": {
                            "201": { "description": "Created author" },
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
                        "summary": "Get an author by id",
                        "tags": ["Authors"],
                        "responses": {
                            "200": { "description": "Author" },
                            "400": { "description": "Malformed id" },
                            "404": { "description": "Author not found" }
                        }
                    },
                    "put": {
                        "summary": "Update an author",
                        "tags": ["Authors"],
                        "responses": {
                            "200": { "description": "Updated author" },
                            "404": { "description": "Author not found" }
                        }
                    },
                    "delete": {
                        "summary": "Delete an author",
                        "tags": ["Authors"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": { "description": "Author not found" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Unique identifier" },
                            "currentName": { "type": "string", "description": "Canonical display name" },
                            "currentNameLower": { "type": "string", "description": "Derived lowercase projection" },
                            "aliases": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Alternate names the author is referenced by"
                            },
                            "aliasesLower": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Derived lowercase projections of aliases"
                            },
                            "birthYear": { "type": "integer" },
                            "deathYear": { "type": "integer" },
                            "nationality": { "type": "string" },
                            "bio": { "type": "string" }
                        },
                        "required": ["id", "currentName"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct AuthorQuery {
    #[serde(default)]
    q: Option<String>,
}

async fn list_authors(
    State(store): State<Arc<AuthorStore>>,
    Query(params): Query<AuthorQuery>,
) -> Json<Vec<Author>> {
    Json(store.search(params.q.as_deref().unwrap_or_default()))
}

async fn get_author(
    State(store): State<Arc<AuthorStore>>,
    Path(id): Path<String>,
) -> Result<Json<Author>, AppError> {
    let id = folio_store::parse_id(&id)?;
    Ok(Json(store.get(id)?))
}

async fn create_author(
    State(store): State<Arc<AuthorStore>>,
    Json(body): Json<NewAuthor>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    let author = store.create(body)?;
    Ok((StatusCode::CREATED, Json(author)))
}

async fn update_author(
    State(store): State<Arc<AuthorStore>>,
    Path(id): Path<String>,
    Json(body): Json<AuthorPatch>,
) -> Result<Json<Author>, AppError> {
    let id = folio_store::parse_id(&id)?;
    Ok(Json(store.update(id, body)?))
}

async fn delete_author(
    State(store): State<Arc<AuthorStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = folio_store::parse_id(&id)?;
    store.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a new instance of the authors module
pub fn create_module(store: Arc<AuthorStore>) -> Arc<dyn Module> {
    Arc::new(AuthorsModule::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn router_with_store() -> (Router, Arc<AuthorStore>) {
        let store = Arc::new(AuthorStore::new());
        let module = AuthorsModule::new(store.clone());
        (module.routes(), store)
    }

    #[tokio::test]
    async fn get_with_malformed_id_is_bad_request() {
        let (router, _store) = router_with_store();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_with_unknown_id_is_not_found() {
        let (router, _store) = router_with_store();
        let id = folio_store::next_id();
        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_missing_name_is_unprocessable() {
        let (router, _store) = router_with_store();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"currentName": ""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let (router, store) = router_with_store();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"currentName": "Bob McTesterson", "aliases": ["Robert M. Tester"]}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(store.search("bob").len(), 1);
    }
}
