//! HTML handlers. Every successful write redirects back to `/` so the next
//! render reads the sheet again.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use bookclub_sheets::StoreError;
use serde::Deserialize;

use super::super::models::{NewBook, Status, StatusForm};
use super::super::service::{AddOutcome, Shelf};
use super::super::view::{self, Flash};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    notice: Option<String>,
}

pub fn router(shelf: Arc<Shelf>) -> Router {
    Router::new()
        .route("/", get(shelf_page))
        .route("/books", post(add_book))
        .route("/books/status", post(update_status))
        .with_state(shelf)
}

async fn shelf_page(State(shelf): State<Arc<Shelf>>, Query(query): Query<PageQuery>) -> Response {
    render(&shelf, Flash::from_notice(query.notice.as_deref())).await
}

async fn add_book(State(shelf): State<Arc<Shelf>>, Form(book): Form<NewBook>) -> Response {
    match shelf.add_book(book).await {
        Ok(AddOutcome::Added(_)) => Redirect::to("/?notice=saved").into_response(),
        Ok(AddOutcome::Skipped) => Redirect::to("/").into_response(),
        Err(err) => failed_write(&shelf, "Saving failed", err).await,
    }
}

async fn update_status(State(shelf): State<Arc<Shelf>>, Form(form): Form<StatusForm>) -> Response {
    if form.title.is_empty() {
        return Redirect::to("/").into_response();
    }

    let status: Status = match form.status.parse() {
        Ok(status) => status,
        Err(err) => return render(&shelf, Some(Flash::Error(format!("Error: {}", err)))).await,
    };

    match shelf.set_status(&form.title, status).await {
        Ok(()) => Redirect::to("/?notice=updated").into_response(),
        Err(err) => failed_write(&shelf, "Error", err).await,
    }
}

/// Re-render the unchanged shelf with the failure shown inline.
async fn failed_write(shelf: &Shelf, prefix: &str, err: StoreError) -> Response {
    tracing::warn!(error = %err, "write rejected");
    if err.is_connection_failure() {
        return halt(&err);
    }
    render(shelf, Some(Flash::Error(format!("{}: {}", prefix, err)))).await
}

async fn render(shelf: &Shelf, flash: Option<Flash>) -> Response {
    match shelf.snapshot().await {
        Ok(snapshot) => Html(view::render_page(&snapshot, flash.as_ref())).into_response(),
        Err(err) => halt(&err),
    }
}

fn halt(err: &StoreError) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(view::render_halt(&err.to_string())),
    )
        .into_response()
}
