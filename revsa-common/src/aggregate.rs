//! Grouping of classified reviews into sentiment buckets
//!
//! [`group`] is a stable partition: every review lands in exactly one bucket
//! and keeps its relative order from the source response. Reviews whose label
//! is not one of the fixed buckets go to the `unrecognized` list instead of
//! being dropped.

use serde::Serialize;

use crate::models::{AnalysisResponse, ReviewResult, Sentiment, SentimentLabel};

/// Reviews of one response partitioned by sentiment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedReviews {
    #[serde(rename = "Positive")]
    pub positive: Vec<ReviewResult>,
    #[serde(rename = "Negative")]
    pub negative: Vec<ReviewResult>,
    #[serde(rename = "Neutral")]
    pub neutral: Vec<ReviewResult>,
    #[serde(rename = "Unrecognized", skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<ReviewResult>,
}

impl GroupedReviews {
    pub fn bucket(&self, sentiment: Sentiment) -> &[ReviewResult] {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
            Sentiment::Neutral => &self.neutral,
        }
    }

    fn bucket_mut(&mut self, sentiment: Sentiment) -> &mut Vec<ReviewResult> {
        match sentiment {
            Sentiment::Positive => &mut self.positive,
            Sentiment::Negative => &mut self.negative,
            Sentiment::Neutral => &mut self.neutral,
        }
    }

    /// Fixed buckets in presentation order (Positive, Negative, Neutral)
    pub fn iter(&self) -> impl Iterator<Item = (Sentiment, &[ReviewResult])> {
        Sentiment::ALL.into_iter().map(move |s| (s, self.bucket(s)))
    }

    /// Number of grouped reviews, unrecognized ones included
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len() + self.neutral.len() + self.unrecognized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition the reviews of `response` by sentiment
pub fn group(response: &AnalysisResponse) -> GroupedReviews {
    let mut grouped = GroupedReviews::default();
    for review in &response.reviews {
        match review.sentiment {
            SentimentLabel::Known(sentiment) => grouped.bucket_mut(sentiment).push(review.clone()),
            SentimentLabel::Unrecognized(_) => grouped.unrecognized.push(review.clone()),
        }
    }
    grouped
}
