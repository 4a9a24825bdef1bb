//! Domain Error Types

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Validation errors for domain value types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Email address failed the format check
    #[error("invalid email address")]
    InvalidEmail,

    /// Country code is not two ASCII letters
    #[error("invalid country code: {0:?}")]
    InvalidCountry(String),

    /// Currency code is not a three-letter ISO code
    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Fee rate must stay below 100%
    #[error("fee rate out of range: {0} bps")]
    RateOutOfRange(u32),

    /// Percentage input that is negative or not a number
    #[error("invalid fee percentage: {0}")]
    InvalidPercent(f64),

    /// Amount exceeds the largest supported minor-unit value
    #[error("amount out of range: {0} minor units")]
    AmountOutOfRange(u64),
}
