//! # revsa common library
//!
//! Shared code for the review sentiment analyzer services:
//! - Data model for classifier responses (counts, per-review results)
//! - Response validation
//! - Aggregation of reviews into sentiment buckets
//! - HTTP adapter for the external classifier
//! - TOML configuration loading

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod validate;

pub use aggregate::{group, GroupedReviews};
pub use classifier::{Classifier, ClassifierError, HttpClassifier};
pub use error::{Error, Result};
pub use models::{AnalysisRequest, AnalysisResponse, Prediction, ReviewResult, Sentiment, SentimentCounts, SentimentLabel};
pub use validate::{validate, ValidationError, ValidationMode};
