//! Payment Provider Interface
//!
//! The seam between the orchestrator and whatever gateway the creator is
//! provisioned on. The orchestrator issues exactly one `create_checkout`
//! per `processing` entry; `verify_payment` must be safe to call more than
//! once for the same reference.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use checkout_core::{BillingInterval, CreatorId, Currency, Email, Gateway};
use checkout_attribution::ViewId;

use crate::session::GatewayReference;

/// Transport-level errors spoken by gateway adapters
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Could not reach the gateway
    #[error("network error: {0}")]
    Network(String),

    /// Gateway refused the request
    #[error("gateway rejected request: {0}")]
    Rejected(String),

    /// Gateway answered with something unusable
    #[error("unusable gateway response: {0}")]
    InvalidResponse(String),

    /// Adapter missing credentials or endpoint configuration
    #[error("gateway not configured: {0}")]
    Config(String),
}

/// Everything a gateway needs to open a hosted checkout
#[derive(Clone, Debug, Serialize)]
pub struct CreateCheckoutRequest {
    pub creator: CreatorId,

    /// The quoted subscriber total, minor units
    pub amount_minor: u64,

    pub currency: Currency,
    pub interval: BillingInterval,
    pub email: Email,
    pub gateway: Gateway,

    /// Attribution handle, when one was obtained
    pub view_id: Option<ViewId>,

    /// Where the gateway sends the browser afterwards
    pub success_url: String,
    pub cancel_url: String,
}

/// Where to send the browser to complete payment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub redirect_url: String,
}

/// Outcome of asking the gateway about a reference
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub verified: bool,

    /// Provider-reported status, surfaced on failure
    pub status: String,
}

/// External payment gateway operations
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Open a hosted checkout and return the redirect target
    async fn create_checkout(
        &self,
        request: &CreateCheckoutRequest,
    ) -> std::result::Result<CheckoutRedirect, ProviderError>;

    /// Ask the gateway whether a returned reference was actually paid
    async fn verify_payment(
        &self,
        gateway: Gateway,
        reference: &GatewayReference,
    ) -> std::result::Result<PaymentVerification, ProviderError>;
}
