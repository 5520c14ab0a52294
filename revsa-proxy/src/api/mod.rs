//! HTTP API handlers for revsa-proxy

pub mod analyze;
pub mod health;
pub mod records;

pub use analyze::{analyze, analyze_routes};
pub use health::health_routes;
pub use records::{get_record, record_routes};
