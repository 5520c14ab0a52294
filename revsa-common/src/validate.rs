//! Classifier response validation
//!
//! Turns a raw JSON payload into an [`AnalysisResponse`] or rejects it.
//! Nothing is repaired: a payload either passes whole or is refused.
//!
//! Both modes require `sentiment_counts.Positive` and
//! `sentiment_counts.Negative` to be non-negative integers whose sum fits in
//! a `u64`, tolerate a missing `Neutral` (treated as 0) and reject any present
//! field of the wrong type. Every `reviews[i]` entry is type-checked in both
//! modes: an object with string `review` and `sentiment` and an optional
//! numeric `score`. [`ValidationMode::Strict`] additionally enforces the count
//! invariants (`total_reviews` and the bucket sum both equal the number of
//! reviews); [`ValidationMode::Minimal`] only logs mismatches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::models::{AnalysisResponse, ReviewResult, SentimentCounts, SentimentLabel};

/// How much of the payload shape is enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Strict,
    Minimal,
}

/// Payload rejected by the validator
///
/// Displays as a fixed string; the field-level diagnostic is only reachable
/// through [`ValidationError::detail`] so it ends up in logs, not in front of
/// users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid response format")]
pub struct ValidationError {
    detail: String,
}

impl ValidationError {
    fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

type Result<T> = std::result::Result<T, ValidationError>;

/// Validate a raw classifier payload
pub fn validate(raw: &Value, mode: ValidationMode) -> Result<AnalysisResponse> {
    let root = raw
        .as_object()
        .ok_or_else(|| ValidationError::new("payload is not a JSON object"))?;

    let counts = root
        .get("sentiment_counts")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::new("sentiment_counts missing or not an object"))?;

    let sentiment_counts = SentimentCounts {
        positive: required_count(counts, "Positive")?,
        negative: required_count(counts, "Negative")?,
        neutral: optional_count(counts, "Neutral")?.unwrap_or(0),
    };

    let reviews = match root.get("reviews") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_review(index, item))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(ValidationError::new("reviews must be an array")),
    };
    let review_count = reviews.len() as u64;

    let total_reviews = match root.get("total_reviews") {
        None => review_count,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| ValidationError::new("total_reviews must be a non-negative integer"))?,
    };

    let processing_time_seconds = match root.get("processing_time") {
        None => 0.0,
        Some(v) => {
            let secs = v
                .as_f64()
                .ok_or_else(|| ValidationError::new("processing_time must be a number"))?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(ValidationError::new("processing_time must be non-negative"));
            }
            secs
        }
    };

    check_invariant(
        mode,
        total_reviews == review_count,
        format!("total_reviews is {} but {} reviews were returned", total_reviews, review_count),
    )?;
    let counts_total = sentiment_counts
        .total()
        .ok_or_else(|| ValidationError::new("sentiment_counts sum overflows"))?;
    check_invariant(
        mode,
        counts_total == review_count,
        format!(
            "sentiment_counts sum to {} but {} reviews were returned",
            counts_total, review_count
        ),
    )?;

    let unrecognized = reviews
        .iter()
        .filter(|r| matches!(r.sentiment, SentimentLabel::Unrecognized(_)))
        .count();
    if unrecognized > 0 {
        warn!(unrecognized, "Classifier returned reviews with unrecognized sentiment labels");
    }

    Ok(AnalysisResponse {
        sentiment_counts,
        reviews,
        total_reviews,
        processing_time_seconds,
    })
}

fn required_count(counts: &Map<String, Value>, key: &str) -> Result<u64> {
    optional_count(counts, key)?
        .ok_or_else(|| ValidationError::new(format!("sentiment_counts.{} is missing", key)))
}

fn optional_count(counts: &Map<String, Value>, key: &str) -> Result<Option<u64>> {
    match counts.get(key) {
        None => Ok(None),
        Some(v) if v.is_number() => v.as_u64().map(Some).ok_or_else(|| {
            ValidationError::new(format!("sentiment_counts.{} must be a non-negative integer", key))
        }),
        Some(_) => Err(ValidationError::new(format!("sentiment_counts.{} must be a number", key))),
    }
}

fn parse_review(index: usize, item: &Value) -> Result<ReviewResult> {
    let obj = item
        .as_object()
        .ok_or_else(|| ValidationError::new(format!("reviews[{}] is not an object", index)))?;

    let text = obj
        .get("review")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new(format!("reviews[{}].review must be a string", index)))?;

    let sentiment = obj
        .get("sentiment")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new(format!("reviews[{}].sentiment must be a string", index)))?;

    let score = match obj.get("score") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_f64()
                .ok_or_else(|| ValidationError::new(format!("reviews[{}].score must be a number", index)))?,
        ),
    };

    Ok(ReviewResult {
        text: text.to_string(),
        sentiment: SentimentLabel::from(sentiment.to_string()),
        score,
    })
}

fn check_invariant(mode: ValidationMode, holds: bool, detail: String) -> Result<()> {
    if holds {
        return Ok(());
    }
    match mode {
        ValidationMode::Strict => Err(ValidationError::new(detail)),
        ValidationMode::Minimal => {
            warn!(detail = %detail, "Classifier response failed a consistency check");
            Ok(())
        }
    }
}
