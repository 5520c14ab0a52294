//! Data model for classifier requests and responses
//!
//! Field names on the wire follow the classifier's JSON (`sentiment_counts`,
//! `total_reviews`, `processing_time`, `review`); Rust names are descriptive.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// One of the fixed sentiment buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// All buckets in presentation order
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Wire label as emitted by the classifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// Parse a classifier label. Matching is exact and case-sensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Positive" => Some(Sentiment::Positive),
            "Negative" => Some(Sentiment::Negative),
            "Neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    /// Chart colour used for this bucket
    pub fn color(&self) -> &'static str {
        match self {
            Sentiment::Positive => "#4caf50",
            Sentiment::Negative => "#f44336",
            Sentiment::Neutral => "#ffeb3b",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label attached to a single review
///
/// Labels outside the fixed buckets are kept verbatim so they can be
/// surfaced instead of disappearing during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Known(Sentiment),
    Unrecognized(String),
}

impl SentimentLabel {
    pub fn sentiment(&self) -> Option<Sentiment> {
        match self {
            SentimentLabel::Known(s) => Some(*s),
            SentimentLabel::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Known(s) => s.as_str(),
            SentimentLabel::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for SentimentLabel {
    fn from(label: String) -> Self {
        match Sentiment::from_label(&label) {
            Some(s) => SentimentLabel::Known(s),
            None => SentimentLabel::Unrecognized(label),
        }
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Known(s) => s.as_str().to_string(),
            SentimentLabel::Unrecognized(raw) => raw,
        }
    }
}

impl From<Sentiment> for SentimentLabel {
    fn from(sentiment: Sentiment) -> Self {
        SentimentLabel::Known(sentiment)
    }
}

/// Classification of a single review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Review text as scraped by the classifier
    #[serde(rename = "review")]
    pub text: String,

    pub sentiment: SentimentLabel,

    /// Star rating or model confidence, when the classifier provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ReviewResult {
    pub fn new(text: impl Into<String>, sentiment: impl Into<SentimentLabel>) -> Self {
        Self {
            text: text.into(),
            sentiment: sentiment.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Per-bucket review counts reported by the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(rename = "Positive")]
    pub positive: u64,
    #[serde(rename = "Negative")]
    pub negative: u64,
    #[serde(rename = "Neutral", default)]
    pub neutral: u64,
}

impl SentimentCounts {
    pub fn get(&self, sentiment: Sentiment) -> u64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    /// Sum of all buckets, `None` if it does not fit in a `u64`
    pub fn total(&self) -> Option<u64> {
        self.positive.checked_add(self.negative)?.checked_add(self.neutral)
    }

    /// Share of `sentiment` in percent (0.0 when there are no counts)
    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        let total = self.positive as u128 + self.negative as u128 + self.neutral as u128;
        if total == 0 {
            0.0
        } else {
            self.get(sentiment) as f64 * 100.0 / total as f64
        }
    }
}

/// Validated classifier response for one analyzed product page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub sentiment_counts: SentimentCounts,
    pub reviews: Vec<ReviewResult>,
    pub total_reviews: u64,
    #[serde(rename = "processing_time")]
    pub processing_time_seconds: f64,
}

/// A request to analyze one product page
///
/// Construction rejects blank URLs; URL syntax is left to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    url: String,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(Error::InvalidInput("product URL must not be empty".to_string()));
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Request body for the single-text classifier shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Response body for the single-text classifier shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip_keeps_unrecognized_text() {
        let label: SentimentLabel = serde_json::from_str("\"Mixed\"").unwrap();
        assert_eq!(label, SentimentLabel::Unrecognized("Mixed".to_string()));
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"Mixed\"");
    }

    #[test]
    fn test_label_matching_is_case_sensitive() {
        assert_eq!(Sentiment::from_label("Positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("positive"), None);
    }

    #[test]
    fn test_counts_percentage() {
        let counts = SentimentCounts { positive: 2, negative: 1, neutral: 1 };
        assert_eq!(counts.total(), Some(4));
        assert_eq!(counts.percentage(Sentiment::Positive), 50.0);
        assert_eq!(SentimentCounts::default().percentage(Sentiment::Neutral), 0.0);
    }

    #[test]
    fn test_counts_near_u64_max() {
        let counts = SentimentCounts { positive: u64::MAX, negative: 1, neutral: 0 };
        assert_eq!(counts.total(), None);
        let share = counts.percentage(Sentiment::Positive);
        assert!(share <= 100.0 && share > 99.9, "got {}", share);
    }

    #[test]
    fn test_request_rejects_blank_url() {
        assert!(AnalysisRequest::new("   ").is_err());
        let request = AnalysisRequest::new(" https://example.com/p/1 ").unwrap();
        assert_eq!(request.url(), "https://example.com/p/1");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "url": "https://example.com/p/1" })
        );
    }

    #[test]
    fn test_review_wire_names() {
        let review = ReviewResult::new("great", Sentiment::Positive).with_score(4.5);
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["review"], "great");
        assert_eq!(json["sentiment"], "Positive");
        assert_eq!(json["score"], 4.5);
    }
}
