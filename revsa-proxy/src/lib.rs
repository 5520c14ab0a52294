//! revsa-proxy library - classification proxy service
//!
//! Forwards review text to the sentiment classifier, stores each outcome and
//! returns the stored record. Exposed as a library so integration tests can
//! drive the router directly.

use axum::Router;
use revsa_common::Classifier;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

use crate::db::RecordStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Outbound classifier (text shape)
    pub classifier: Arc<dyn Classifier>,
    /// Record storage; the only state shared between requests
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>, store: Arc<dyn RecordStore>) -> Self {
        Self { classifier, store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::record_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
