//! Read-back of stored records
//!
//! GET /records/:id returns a record written by `/analyze`.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::db::PersistedRecord;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /records/:id
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PersistedRecord>> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest(format!("Invalid record id: {}", id)))?;

    state
        .store
        .load(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Record {} not found", id)))
}

pub fn record_routes() -> Router<AppState> {
    Router::new().route("/records/:id", get(get_record))
}
