//! Core error types for the return engine.
//!
//! Feed errors cover everything collaborators can fail with; the engine
//! propagates them without retrying. Calculation and validation errors are
//! the engine's own.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::performance::FailedAccount;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the return engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Feed operation failed: {0}")]
    Feed(#[from] FeedError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Return calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    /// Every account in an aggregate request failed to fetch. Partial
    /// failures are not an error; they ride along on the success value.
    #[error("aggregate fetch failed for all {} accounts", .failed.len())]
    AllAccountsFailed { failed: Vec<FailedAccount> },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors surfaced by the external snapshot, ledger and balance feeds.
///
/// Transport retry policy belongs to the feed implementation, not the
/// engine; these arrive here already final.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors that occur during return calculations.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Negative equity in snapshot history: {0}")]
    NegativeEquity(String),

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
