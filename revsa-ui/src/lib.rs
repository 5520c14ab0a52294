//! revsa-ui library
//!
//! Client tier of the review sentiment analyzer: drives one analysis at a
//! time against the classifier and renders the outcome.

pub mod orchestrator;
pub mod render;

pub use orchestrator::{FailureKind, Orchestrator, RequestState, SubmitError, GENERIC_ERROR_MESSAGE};
pub use render::{chart_series, render_response, render_state, ChartSeries, JsonReport};
