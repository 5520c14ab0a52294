//! Integration tests for revsa-proxy API endpoints
//!
//! Tests cover:
//! - POST /analyze success, bad input, classifier failure, storage failure
//! - GET /records/:id read-back
//! - GET /health, including an unreachable database

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use revsa_common::{AnalysisRequest, Classifier, ClassifierError, Prediction};
use revsa_proxy::db::{init_tables, SqliteRecordStore};
use revsa_proxy::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

/// Fake classifier: fixed outcome, counts calls
struct StubClassifier {
    outcome: Result<String, ()>,
    calls: AtomicUsize,
}

impl StubClassifier {
    fn predicting(label: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(label.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, _request: &AnalysisRequest) -> Result<Value, ClassifierError> {
        unreachable!("proxy only uses the text shape")
    }

    async fn predict_text(&self, _text: &str) -> Result<Prediction, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(label) => Ok(Prediction {
                prediction: label.clone(),
            }),
            Err(()) => Err(ClassifierError::Timeout(Duration::from_secs(30))),
        }
    }
}

/// Test helper: in-memory database with schema
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    init_tables(&pool).await.expect("Failed to initialize schema");
    pool
}

fn setup_app(pool: SqlitePool, classifier: Arc<StubClassifier>) -> axum::Router {
    let state = AppState::new(classifier, Arc::new(SqliteRecordStore::new(pool)));
    build_router(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// POST /analyze
// =============================================================================

#[tokio::test]
async fn test_analyze_stores_and_returns_record() {
    let pool = setup_test_db().await;
    let classifier = StubClassifier::predicting("Positive");
    let app = setup_app(pool.clone(), classifier.clone());

    let response = app
        .oneshot(post_json("/analyze", json!({ "text": "nice product" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["text"], "nice product");
    assert_eq!(body["prediction"], "Positive");
    assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert!(body["created_at"].is_string());
    assert_eq!(classifier.calls(), 1);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sentiments WHERE text = 'nice product'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn test_analyze_then_read_back() {
    let pool = setup_test_db().await;
    let app = setup_app(pool, StubClassifier::predicting("Negative"));

    let response = app
        .clone()
        .oneshot(post_json("/analyze", json!({ "text": "broke after a day" })))
        .await
        .unwrap();
    let created = extract_json(response.into_body()).await;
    let id = created["id"].as_str().unwrap();

    let response = app.oneshot(get(&format!("/records/{}", id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let loaded = extract_json(response.into_body()).await;
    assert_eq!(loaded, created);
}

#[tokio::test]
async fn test_analyze_rejects_blank_text_without_calling_classifier() {
    let classifier = StubClassifier::predicting("Positive");
    let app = setup_app(setup_test_db().await, classifier.clone());

    for body in [json!({ "text": "   " }), json!({}), json!({ "text": null })] {
        let response = app.clone().oneshot(post_json("/analyze", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error_kind"], "BAD_REQUEST");
    }

    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_analyze_rejects_malformed_json() {
    let app = setup_app(setup_test_db().await, StubClassifier::predicting("Positive"));

    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from("{\"text\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_classifier_failure_is_500_and_nothing_stored() {
    let pool = setup_test_db().await;
    let app = setup_app(pool.clone(), StubClassifier::failing());

    let response = app
        .oneshot(post_json("/analyze", json!({ "text": "nice product" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error_kind"], "CLASSIFIER_ERROR");
    assert_eq!(body["error"], "Sentiment classification failed");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sentiments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let pool = setup_test_db().await;
    let app = setup_app(pool.clone(), StubClassifier::predicting("Positive"));
    pool.close().await;

    let response = app
        .oneshot(post_json("/analyze", json!({ "text": "nice product" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error_kind"], "PERSISTENCE_ERROR");
    // The raw database error stays in the logs
    assert!(!body["error"].as_str().unwrap().contains("pool"));
}

// =============================================================================
// GET /records/:id
// =============================================================================

#[tokio::test]
async fn test_unknown_record_is_404() {
    let app = setup_app(setup_test_db().await, StubClassifier::predicting("Positive"));

    let uri = format!("/records/{}", uuid::Uuid::new_v4());
    let response = app.oneshot(get(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error_kind"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_record_id_is_400() {
    let app = setup_app(setup_test_db().await, StubClassifier::predicting("Positive"));

    let response = app.oneshot(get("/records/not-a-uuid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(setup_test_db().await, StubClassifier::predicting("Positive"));

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "revsa-proxy");
    assert!(body["version"].is_string());
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let pool = setup_test_db().await;
    let app = setup_app(pool.clone(), StubClassifier::predicting("Positive"));
    pool.close().await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unavailable");
}
