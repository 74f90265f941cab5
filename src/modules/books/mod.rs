//! The shelf: one table of books, an add form and a status control.

pub mod models;
pub mod routes;
pub mod service;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use bookclub_kernel::settings::Settings;
use bookclub_kernel::{InitCtx, Module};
use bookclub_sheets::Connection;

use service::Shelf;

/// Books module serving the shelf page and its JSON twin.
pub struct BooksModule {
    shelf: Arc<Shelf>,
}

impl BooksModule {
    pub fn new(shelf: Arc<Shelf>) -> Self {
        Self { shelf }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            cache_ttl_secs = ctx.settings.sheet.cache_ttl_secs,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::api::router(Arc::clone(&self.shelf))
    }

    fn pages(&self) -> Router {
        routes::pages::router(Arc::clone(&self.shelf))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
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

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List every book on the shelf",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "Books in sheet order",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "503": error_response("Store connection unavailable")
                    }
                },
                "post": {
                    "summary": "Add a book with status Available",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateBook" }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "Book appended",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "422": error_response("Title missing"),
                        "502": error_response("Store rejected the write"),
                        "503": error_response("Store connection unavailable")
                    }
                }
            },
            "/status": {
                "post": {
                    "summary": "Set the status of the first book with the given title",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/StatusChange" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Status written",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/StatusChange" }
                                }
                            }
                        },
                        "404": error_response("No book with that title"),
                        "422": error_response("Title or status invalid"),
                        "502": error_response("Store rejected the write")
                    }
                }
            },
            "/current": {
                "get": {
                    "summary": "Book currently being read, if any",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "First book whose status is Currently Reading",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "current": {
                                                "oneOf": [
                                                    { "$ref": "#/components/schemas/Book" },
                                                    { "type": "null" }
                                                ]
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Status": {
                    "type": "string",
                    "enum": ["Available", "Borrowed", "Currently Reading", "Lost"]
                },
                "Book": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "owner": { "type": "string" },
                        "status": {
                            "type": "string",
                            "description": "Stored label; normally one of the Status values"
                        }
                    },
                    "required": ["title", "author", "owner", "status"]
                },
                "CreateBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "owner": { "type": "string" }
                    },
                    "required": ["title"]
                },
                "StatusChange": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "status": { "$ref": "#/components/schemas/Status" }
                    },
                    "required": ["title", "status"]
                }
            }
        }
    })
}

/// Create the books module over the shared store connection
pub fn create_module(settings: &Settings, connection: Arc<Connection>) -> Arc<dyn Module> {
    let ttl = Duration::from_secs(settings.sheet.cache_ttl_secs);
    Arc::new(BooksModule::new(Arc::new(Shelf::new(connection, ttl))))
}
