//! Presentation of analysis state
//!
//! Text output mirrors the results page: a summary line, a bar chart of the
//! bucket counts and the reviews listed per bucket. [`JsonReport`] carries the
//! same data for `--json`.

use revsa_common::{group, AnalysisResponse, GroupedReviews, ReviewResult, Sentiment, SentimentCounts};
use serde::Serialize;
use std::fmt::Write;

use crate::orchestrator::{FailureKind, RequestState};

const BAR_WIDTH: usize = 30;

/// Data behind the sentiment distribution chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<&'static str>,
    pub data: Vec<u64>,
    pub colors: Vec<&'static str>,
}

/// Chart series for the fixed buckets in presentation order
pub fn chart_series(counts: &SentimentCounts) -> ChartSeries {
    ChartSeries {
        labels: Sentiment::ALL.iter().map(Sentiment::as_str).collect(),
        data: Sentiment::ALL.iter().map(|s| counts.get(*s)).collect(),
        colors: Sentiment::ALL.iter().map(Sentiment::color).collect(),
    }
}

pub fn summary_line(response: &AnalysisResponse) -> String {
    format!(
        "Total Reviews: {} | Processing Time: {:.2} seconds",
        response.total_reviews, response.processing_time_seconds
    )
}

/// Full text report for a successful analysis
pub fn render_response(response: &AnalysisResponse) -> String {
    let grouped = group(response);
    let mut out = String::new();

    out.push_str("Sentiment Analysis Results\n");
    out.push_str(&summary_line(response));
    out.push_str("\n\n");

    let counts = &response.sentiment_counts;
    for sentiment in Sentiment::ALL {
        let filled = ((counts.percentage(sentiment) / 100.0 * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
        let _ = writeln!(
            out,
            "{:<9} {}{} {:5.1}% ({})",
            sentiment.as_str(),
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled),
            counts.percentage(sentiment),
            counts.get(sentiment)
        );
    }

    for (sentiment, reviews) in grouped.iter() {
        out.push('\n');
        write_bucket(&mut out, sentiment.as_str(), reviews);
    }
    if !grouped.unrecognized.is_empty() {
        out.push('\n');
        write_bucket(&mut out, "Unrecognized", &grouped.unrecognized);
    }

    out
}

fn write_bucket(out: &mut String, name: &str, reviews: &[ReviewResult]) {
    let _ = writeln!(out, "{} reviews ({})", name, reviews.len());
    if reviews.is_empty() {
        out.push_str("  (none)\n");
        return;
    }
    for (i, review) in reviews.iter().enumerate() {
        let _ = write!(out, "  {}. {}", i + 1, review.text);
        if let Some(score) = review.score {
            let _ = write!(out, " [score {}]", score);
        }
        if let Some(label) = unrecognized_label(review) {
            let _ = write!(out, " [label {:?}]", label);
        }
        out.push('\n');
    }
}

fn unrecognized_label(review: &ReviewResult) -> Option<&str> {
    match review.sentiment.sentiment() {
        Some(_) => None,
        None => Some(review.sentiment.as_str()),
    }
}

/// Text for any orchestrator state
pub fn render_state(state: &RequestState) -> String {
    match state {
        RequestState::Idle => String::new(),
        RequestState::Pending => "Analyzing...\n".to_string(),
        RequestState::Success(response) => render_response(response),
        RequestState::Failed { message, .. } => format!("{}\n", message),
    }
}

/// Machine-readable view of a state
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<&'a AnalysisResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouped: Option<GroupedReviews>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

impl<'a> JsonReport<'a> {
    pub fn from_state(state: &'a RequestState) -> Self {
        let name = match state {
            RequestState::Idle => "idle",
            RequestState::Pending => "pending",
            RequestState::Success(_) => "success",
            RequestState::Failed { .. } => "failed",
        };
        let response = state.response();
        Self {
            state: name,
            response,
            grouped: response.map(group),
            chart: response.map(|r| chart_series(&r.sentiment_counts)),
            error: state.error_message(),
            error_kind: state.failure_kind(),
        }
    }
}
