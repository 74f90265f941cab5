//! Error envelope for the JSON API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Body nested under `"error"` in every failed API response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub details: Vec<Value>,
    pub trace_id: String,
    pub timestamp: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String, details: Vec<Value> },

    #[error("not found: {0}")]
    NotFound(String),

    /// The store cannot be reached or authenticated against.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The store answered but refused or garbled the request.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(details: Vec<Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::ServiceUnavailable(_) => "service_unavailable",
            AppError::Upstream(_) => "upstream_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn into_body(self) -> ErrorBody {
        let code = self.code();
        let (message, details) = match self {
            AppError::Validation { message, details } => (message, details),
            AppError::NotFound(message)
            | AppError::ServiceUnavailable(message)
            | AppError::Upstream(message) => (message, Vec::new()),
            // Release builds keep internal details in the log only
            AppError::Internal(e) if cfg!(not(debug_assertions)) => {
                tracing::error!(error = %e, "internal error");
                ("An internal server error occurred".to_string(), Vec::new())
            }
            AppError::Internal(e) => (e.to_string(), Vec::new()),
        };

        ErrorBody {
            code,
            message,
            details,
            trace_id: Uuid::new_v4().to_string(),
            timestamp: OffsetDateTime::now_utc().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.into_body();

        if status.is_server_error() {
            tracing::error!(
                trace_id = %body.trace_id,
                code = body.code,
                status = status.as_u16(),
                message = %body.message,
                "request failed"
            );
        } else {
            tracing::warn!(
                trace_id = %body.trace_id,
                code = body.code,
                status = status.as_u16(),
                message = %body.message,
                "request rejected"
            );
        }

        (status, Json(json!({ "error": body }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn statuses_and_codes() {
        let cases = [
            (AppError::not_found("x"), StatusCode::NOT_FOUND, "not_found"),
            (
                AppError::service_unavailable("no credentials"),
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
            ),
            (
                AppError::upstream("quota exceeded"),
                StatusCode::BAD_GATEWAY,
                "upstream_error",
            ),
            (
                AppError::from(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
        ];
        for (error, status, code) in cases {
            assert_eq!(error.status(), status);
            assert_eq!(error.code(), code);
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn validation_envelope() {
        let error = AppError::validation(
            vec![json!({"field": "title", "error": "required"})],
            "a book needs a title",
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        let error = &body["error"];
        assert_eq!(error["code"], "validation_error");
        assert_eq!(error["message"], "a book needs a title");
        assert_eq!(error["details"][0]["field"], "title");
        assert!(Uuid::parse_str(error["trace_id"].as_str().unwrap()).is_ok());
        assert!(!error["timestamp"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn not_found_has_empty_details() {
        let body = body_json(AppError::not_found("no book titled 'Solaris'").into_response()).await;
        assert_eq!(body["error"]["message"], "no book titled 'Solaris'");
        assert_eq!(body["error"]["details"], json!([]));
    }
}
