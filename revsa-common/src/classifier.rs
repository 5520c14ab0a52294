//! Sentiment classifier client
//!
//! The classifier is an external HTTP service exposing `POST /predict`. It
//! accepts two request shapes:
//! - `{"url": ...}`: scrape the product page and classify every review,
//!   answering with counts, per-review labels and timing
//! - `{"text": ...}`: classify a single text, answering `{"prediction": ...}`
//!
//! The URL shape is the primary contract; the text shape is the older
//! single-review integration still used by the proxy.
//!
//! One call per request. Nothing is retried here.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{AnalysisRequest, Prediction, TextRequest};

const USER_AGENT: &str = concat!("revsa/", env!("CARGO_PKG_VERSION"));

/// Default request timeout for classifier calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Classifier transport errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Network error calling {endpoint}: {cause}")]
    Network { endpoint: String, cause: String },

    /// No response within the configured timeout
    #[error("Classifier did not respond within {0:?}")]
    Timeout(Duration),

    /// Classifier answered with a non-success status
    #[error("Classifier returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON
    #[error("Failed to decode classifier response: {0}")]
    Decode(String),
}

/// Outbound classification calls
///
/// Implemented over HTTP by [`HttpClassifier`]; tests substitute their own.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Analyze a product page, returning the raw (unvalidated) payload
    async fn classify(&self, request: &AnalysisRequest) -> Result<Value, ClassifierError>;

    /// Classify a single piece of text
    async fn predict_text(&self, text: &str) -> Result<Prediction, ClassifierError>;
}

/// HTTP client for the classifier's `/predict` endpoint
pub struct HttpClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpClassifier {
    /// Create a client posting to `endpoint` (full URL including `/predict`)
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let endpoint = endpoint.into();
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Network {
                endpoint: endpoint.clone(),
                cause: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<B: serde::Serialize + ?Sized>(&self, body: &B) -> Result<reqwest::Response, ClassifierError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    fn transport_error(&self, e: reqwest::Error) -> ClassifierError {
        if e.is_timeout() {
            ClassifierError::Timeout(self.timeout)
        } else {
            ClassifierError::Network {
                endpoint: self.endpoint.clone(),
                cause: e.to_string(),
            }
        }
    }

    fn decode_error(&self, e: reqwest::Error) -> ClassifierError {
        if e.is_timeout() {
            ClassifierError::Timeout(self.timeout)
        } else {
            ClassifierError::Decode(e.to_string())
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, request: &AnalysisRequest) -> Result<Value, ClassifierError> {
        tracing::debug!(endpoint = %self.endpoint, url = %request.url(), "Requesting review classification");

        let payload: Value = self
            .post(request)
            .await?
            .json()
            .await
            .map_err(|e| self.decode_error(e))?;

        tracing::info!(url = %request.url(), "Classifier responded");
        Ok(payload)
    }

    async fn predict_text(&self, text: &str) -> Result<Prediction, ClassifierError> {
        tracing::debug!(endpoint = %self.endpoint, chars = text.len(), "Requesting text prediction");

        let body = TextRequest { text: text.to_string() };
        let prediction: Prediction = self
            .post(&body)
            .await?
            .json()
            .await
            .map_err(|e| self.decode_error(e))?;

        tracing::info!(prediction = %prediction.prediction, "Classifier prediction received");
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClassifier::new("http://127.0.0.1:5001/predict", DEFAULT_TIMEOUT);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().endpoint(), "http://127.0.0.1:5001/predict");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClassifier::new(format!("http://{}/predict", addr), Duration::from_secs(2)).unwrap();
        let request = AnalysisRequest::new("https://example.com/p/1").unwrap();

        let err = client.classify(&request).await.unwrap_err();
        assert!(matches!(err, ClassifierError::Network { .. }), "got {:?}", err);
    }
}
