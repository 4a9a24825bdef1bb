//! Flow Error Types
//!
//! The user-visible error taxonomy of the purchase path. Attribution
//! failures never appear here; they are swallowed at their call sites.

use thiserror::Error;

use crate::provider::ProviderError;

/// Result type alias for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Which input field failed local validation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    Email,
    Price,
}

/// Checkout flow errors
#[derive(Error, Debug)]
pub enum FlowError {
    /// Local input validation; inline, never contacts a service
    #[error("invalid input: {0:?}")]
    Validation(FieldError),

    /// Checkout creation failed; no charge assumed, freely retryable
    #[error("checkout creation failed: {0}")]
    Creation(ProviderError),

    /// Verification errored after a gateway return; money may have moved
    #[error("payment verification failed: {0}")]
    Verification(ProviderError),

    /// Gateway answered, but reported the payment as not verified
    #[error("payment not verified: {0}")]
    VerificationRejected(String),

    /// Success signal on return without a usable reference
    #[error("invalid payment session")]
    InvalidSession,

    /// The session already reached its sticky terminal state
    #[error("checkout already completed")]
    AlreadyCompleted,

    /// Operation not allowed in the current phase
    #[error("operation not allowed in current phase")]
    InvalidPhase,

    /// Missing or unusable configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl FlowError {
    /// Whether a fresh user action may simply try again.
    ///
    /// Verification failures are deliberately not retryable here: a charge
    /// may already exist, so they require an explicit user decision.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Creation(_))
    }

    /// User-facing wording
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(FieldError::Email) => "Please enter a valid email address.",
            Self::Validation(FieldError::Price) => "This subscription is not available for purchase.",
            Self::Creation(_) => "We couldn't start your checkout. You have not been charged - please try again.",
            Self::Verification(_) | Self::VerificationRejected(_) => {
                "We couldn't confirm your payment. If you were charged, retry verification or contact support."
            }
            Self::InvalidSession => "Invalid payment session. If you were charged, please contact support.",
            Self::AlreadyCompleted => "Your subscription is already active.",
            Self::InvalidPhase => "Checkout is already in progress.",
            Self::Config(_) => "Checkout is not configured for this page.",
        }
    }
}
