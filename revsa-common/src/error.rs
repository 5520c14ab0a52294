//! Common error types for revsa

use thiserror::Error;

/// Common result type for revsa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from configuration loading and request construction
///
/// Classifier and validation failures keep their own types
/// ([`crate::ClassifierError`], [`crate::ValidationError`]) so callers can
/// map them to a failure kind.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
