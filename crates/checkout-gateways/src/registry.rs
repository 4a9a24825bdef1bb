//! Provider Registry
//!
//! The single place that dispatches on `Gateway`. Everything downstream
//! of the router talks to `PaymentProvider` and stays provider-agnostic.

use async_trait::async_trait;

use checkout_core::Gateway;
use checkout_flow::{
    CheckoutRedirect, CreateCheckoutRequest, GatewayReference, PaymentProvider,
    PaymentVerification, ProviderError,
};

use crate::primary::StripeGateway;
use crate::regional::PaystackGateway;

/// Holds one adapter per provisioned gateway
pub struct ProviderRegistry {
    primary: Option<StripeGateway>,
    regional: Option<PaystackGateway>,
}

impl ProviderRegistry {
    pub fn new(primary: Option<StripeGateway>, regional: Option<PaystackGateway>) -> Self {
        Self { primary, regional }
    }

    /// Build from environment; a gateway missing its credentials is
    /// simply absent and requests routed to it fail with `Config`.
    pub fn from_env() -> Self {
        let primary = StripeGateway::from_env().ok();
        let regional = PaystackGateway::from_env().ok();
        if primary.is_none() {
            tracing::warn!("primary gateway not configured");
        }
        if regional.is_none() {
            tracing::warn!("regional gateway not configured");
        }
        Self::new(primary, regional)
    }

    fn primary(&self) -> Result<&StripeGateway, ProviderError> {
        self.primary
            .as_ref()
            .ok_or_else(|| ProviderError::Config("primary gateway not configured".into()))
    }

    fn regional(&self) -> Result<&PaystackGateway, ProviderError> {
        self.regional
            .as_ref()
            .ok_or_else(|| ProviderError::Config("regional gateway not configured".into()))
    }
}

#[async_trait]
impl PaymentProvider for ProviderRegistry {
    async fn create_checkout(
        &self,
        request: &CreateCheckoutRequest,
    ) -> Result<CheckoutRedirect, ProviderError> {
        match request.gateway {
            Gateway::Primary => self.primary()?.create_checkout(request).await,
            Gateway::Regional => self.regional()?.create_checkout(request).await,
        }
    }

    async fn verify_payment(
        &self,
        gateway: Gateway,
        reference: &GatewayReference,
    ) -> Result<PaymentVerification, ProviderError> {
        match gateway {
            Gateway::Primary => self.primary()?.verify_payment(reference).await,
            Gateway::Regional => self.regional()?.verify_payment(reference).await,
        }
    }
}
