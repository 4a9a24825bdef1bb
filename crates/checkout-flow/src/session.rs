//! Checkout Session Entity
//!
//! One buyer's visit: the state-machine phase plus the few fields that
//! must survive re-renders but not navigation. Created on first render of
//! the purchase screen, mutated only by the orchestrator, discarded when
//! the buyer navigates away.

use serde::{Deserialize, Serialize};

use checkout_attribution::ViewId;

use crate::error::FieldError;

/// Opaque identifier issued by the gateway on redirect return
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GatewayReference(String);

impl GatewayReference {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GatewayReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State-machine phase.
///
/// `Redirecting` is a suspend point across a full browser navigation, not
/// an in-process wait; `Verifying` is the one phase entered directly on
/// page load, and only via a provider reference in the return URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    Processing,
    Redirecting { redirect_url: String },
    Verifying,
    Success,
}

impl CheckoutPhase {
    /// Success is sticky for the life of the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Possibly-charged failure surfaced after a gateway return.
///
/// Distinct from a validation failure because money may already have
/// moved; the wording never implies no charge occurred, and the only exits
/// are explicit retry-verification or support escalation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentIssue {
    /// Verification came back negative or ambiguous
    VerificationFailed { status: String },

    /// Success signal without a usable reference
    InvalidSession,
}

impl PaymentIssue {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::VerificationFailed { .. } => {
                "We couldn't confirm your payment. If you were charged, retry verification or contact support."
            }
            Self::InvalidSession => {
                "Invalid payment session. If you were charged, please contact support."
            }
        }
    }
}

/// The central mutable entity of one buyer's visit
#[derive(Clone, Debug)]
pub struct CheckoutSession {
    pub phase: CheckoutPhase,

    /// Attribution handle, created at most once per session
    pub view_id: Option<ViewId>,

    /// Populated only after an external redirect returns
    pub gateway_reference: Option<GatewayReference>,

    /// Explicit verification retries; never incremented automatically
    pub retry_count: u32,

    /// Inline validation error, if any
    pub field_error: Option<FieldError>,

    /// Possibly-charged sub-state, if any
    pub issue: Option<PaymentIssue>,
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self {
            phase: CheckoutPhase::Idle,
            view_id: None,
            gateway_reference: None,
            retry_count: 0,
            field_error: None,
            issue: None,
        }
    }
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_idle() {
        let session = CheckoutSession::new();
        assert_eq!(session.phase, CheckoutPhase::Idle);
        assert!(session.view_id.is_none());
        assert!(session.gateway_reference.is_none());
        assert_eq!(session.retry_count, 0);
    }

    #[test]
    fn test_only_success_is_terminal() {
        assert!(CheckoutPhase::Success.is_terminal());
        assert!(!CheckoutPhase::Idle.is_terminal());
        assert!(!CheckoutPhase::Verifying.is_terminal());
    }
}
