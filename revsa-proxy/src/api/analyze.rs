//! Text analysis endpoint
//!
//! POST /analyze: classify one text, store the outcome, return the stored
//! record. Classification and storage run one after the other; a failure in
//! either ends the request with a 500 and nothing is retried.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::db::PersistedRecord;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /analyze request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /analyze
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<PersistedRecord>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("text must be a non-empty string".to_string()))?;

    let prediction = state.classifier.predict_text(&text).await?;
    let record = state.store.persist(&text, &prediction.prediction).await?;

    tracing::info!(
        id = %record.id,
        prediction = %record.prediction,
        "Text classified and stored"
    );

    Ok(Json(record))
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}
