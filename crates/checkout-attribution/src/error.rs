//! Attribution Error Types
//!
//! These errors never cross into the purchase path; every call site logs
//! and swallows them.

use thiserror::Error;

/// Result type alias for attribution operations
pub type Result<T> = std::result::Result<T, AttributionError>;

/// Attribution-related errors
#[derive(Error, Debug)]
pub enum AttributionError {
    /// Transport-level failure talking to the analytics service
    #[error("attribution request failed: {0}")]
    Http(String),

    /// Service answered with something we could not use
    #[error("unusable attribution response: {0}")]
    InvalidResponse(String),
}
