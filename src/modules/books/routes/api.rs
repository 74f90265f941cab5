//! JSON API mounted under `/api/books`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bookclub_http::error::AppError;
use bookclub_sheets::StoreError;
use serde::Serialize;
use serde_json::json;

use super::super::models::{BookRecord, NewBook, Status, StatusChange};
use super::super::service::{AddOutcome, Shelf};

#[derive(Debug, Serialize)]
pub struct CurrentPick {
    pub current: Option<BookRecord>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdated {
    pub title: String,
    pub status: Status,
}

pub fn router(shelf: Arc<Shelf>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/status", post(update_status))
        .route("/current", get(current_book))
        .route("/health", get(health_check))
        .with_state(shelf)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(shelf): State<Arc<Shelf>>) -> Result<Json<Vec<BookRecord>>, AppError> {
    let snapshot = shelf.snapshot().await.map_err(store_error)?;
    Ok(Json(snapshot.records))
}

async fn current_book(State(shelf): State<Arc<Shelf>>) -> Result<Json<CurrentPick>, AppError> {
    let snapshot = shelf.snapshot().await.map_err(store_error)?;
    Ok(Json(CurrentPick {
        current: snapshot.current_pick().cloned(),
    }))
}

async fn create_book(
    State(shelf): State<Arc<Shelf>>,
    Json(book): Json<NewBook>,
) -> Result<(StatusCode, Json<BookRecord>), AppError> {
    match shelf.add_book(book).await.map_err(store_error)? {
        AddOutcome::Added(record) => Ok((StatusCode::CREATED, Json(record))),
        AddOutcome::Skipped => Err(title_required()),
    }
}

async fn update_status(
    State(shelf): State<Arc<Shelf>>,
    Json(change): Json<StatusChange>,
) -> Result<Json<StatusUpdated>, AppError> {
    if change.title.trim().is_empty() {
        return Err(title_required());
    }
    shelf
        .set_status(&change.title, change.status)
        .await
        .map_err(store_error)?;
    Ok(Json(StatusUpdated {
        title: change.title,
        status: change.status,
    }))
}

fn title_required() -> AppError {
    AppError::validation(
        vec![json!({"field": "title", "error": "required"})],
        "a book needs a title",
    )
}

/// Map store failures onto the HTTP error envelope.
pub fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::EmptyTitle => title_required(),
        StoreError::TitleNotFound(_) => AppError::not_found(err.to_string()),
        err if err.is_connection_failure() => AppError::service_unavailable(err.to_string()),
        err => AppError::upstream(err.to_string()),
    }
}
