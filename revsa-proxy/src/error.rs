//! Error types for revsa-proxy
//!
//! Every failure becomes a JSON body `{"error": ..., "error_kind": ...}`.
//! `error` is a fixed human-readable string per kind; the underlying cause is
//! logged here and never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use revsa_common::ClassifierError;
use serde_json::json;
use thiserror::Error;

use crate::db::PersistenceError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Classifier call failed (500)
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Storage write or read failed (500)
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ApiError {
    /// Machine-readable kind sent as `error_kind`
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Classifier(_) => "CLASSIFIER_ERROR",
            ApiError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Classifier(e) => {
                tracing::error!(error = %e, "Classification failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Sentiment classification failed".to_string(),
                )
            }
            ApiError::Persistence(e) => {
                tracing::error!(error = %e, "Persistence failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store classification result".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "error_kind": kind,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
