//! Stripe Gateway (primary)
//!
//! Hosted Checkout in subscription mode: the buyer is redirected to
//! Stripe's page and comes back with a `session_id` we verify by
//! retrieving the session and checking its payment status.

use std::collections::HashMap;
use std::str::FromStr;

use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionId, CheckoutSessionMode,
    CheckoutSessionPaymentStatus, Client, CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData, CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionLineItemsPriceDataRecurring,
    CreateCheckoutSessionLineItemsPriceDataRecurringInterval, Currency as StripeCurrency,
};

use checkout_core::BillingInterval;
use checkout_flow::{
    CheckoutRedirect, CreateCheckoutRequest, GatewayReference, PaymentVerification, ProviderError,
};

/// Stripe client wrapper
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ProviderError> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| ProviderError::Config("STRIPE_SECRET_KEY not set".into()))?;
        Ok(Self::new(&secret_key))
    }

    /// Open a hosted checkout session and return its redirect URL
    pub async fn create_checkout(
        &self,
        request: &CreateCheckoutRequest,
    ) -> Result<CheckoutRedirect, ProviderError> {
        let currency = stripe_currency(request.currency.as_str())?;

        let mut params = CreateCheckoutSession::new();
        params.customer_email = Some(request.email.as_str());
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(CheckoutSessionMode::Subscription);

        let mut metadata = HashMap::new();
        metadata.insert("creator_id".to_string(), request.creator.as_str().to_string());
        if let Some(ref view) = request.view_id {
            metadata.insert("view_id".to_string(), view.as_str().to_string());
        }
        params.metadata = Some(metadata);

        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency,
                unit_amount: Some(request.amount_minor as i64),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: format!("Subscription to {}", request.creator),
                    ..Default::default()
                }),
                recurring: Some(CreateCheckoutSessionLineItemsPriceDataRecurring {
                    interval: match request.interval {
                        BillingInterval::Monthly => {
                            CreateCheckoutSessionLineItemsPriceDataRecurringInterval::Month
                        }
                        BillingInterval::Yearly => {
                            CreateCheckoutSessionLineItemsPriceDataRecurringInterval::Year
                        }
                    },
                    interval_count: Some(1),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| ProviderError::Rejected(e.to_string()))?;

        let redirect_url = session
            .url
            .ok_or_else(|| ProviderError::InvalidResponse("no checkout URL returned".into()))?;

        Ok(CheckoutRedirect { redirect_url })
    }

    /// Verify a returned session reference. Safe to call repeatedly.
    pub async fn verify_payment(
        &self,
        reference: &GatewayReference,
    ) -> Result<PaymentVerification, ProviderError> {
        let id = CheckoutSessionId::from_str(reference.as_str())
            .map_err(|_| ProviderError::InvalidResponse("malformed session reference".into()))?;

        let session = StripeCheckoutSession::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let verified = matches!(
            session.payment_status,
            CheckoutSessionPaymentStatus::Paid | CheckoutSessionPaymentStatus::NoPaymentRequired
        );

        Ok(PaymentVerification {
            verified,
            status: format!("{:?}", session.payment_status).to_lowercase(),
        })
    }
}

fn stripe_currency(code: &str) -> Result<StripeCurrency, ProviderError> {
    serde_json::from_value(serde_json::Value::String(code.to_ascii_lowercase()))
        .map_err(|_| ProviderError::Config(format!("currency {code} not supported by gateway")))
}
