//! Regional Gateway (Paystack)
//!
//! REST adapter for the regional processor: initialize a transaction to
//! get an authorization URL, then verify the returned reference. The
//! processor settles domestically in the creator's home currency.

use serde::{Deserialize, Serialize};

use checkout_flow::{
    CheckoutRedirect, CreateCheckoutRequest, GatewayReference, PaymentVerification, ProviderError,
};

/// Regional processor configuration
#[derive(Clone, Debug)]
pub struct PaystackConfig {
    /// API base URL, no trailing slash
    pub base_url: String,

    /// Secret key for bearer auth
    pub secret_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl PaystackConfig {
    pub fn from_env() -> Result<Self, ProviderError> {
        let secret_key = std::env::var("PAYSTACK_SECRET_KEY")
            .map_err(|_| ProviderError::Config("PAYSTACK_SECRET_KEY not set".into()))?;
        let base_url = std::env::var("PAYSTACK_BASE_URL")
            .unwrap_or_else(|_| "https://api.paystack.co".into());
        Ok(Self {
            base_url,
            secret_key,
            timeout_secs: 10,
        })
    }
}

#[derive(Serialize)]
struct InitializeBody<'a> {
    email: &'a str,
    /// Amount in subunits of the transaction currency
    amount: u64,
    currency: &'a str,
    callback_url: &'a str,
    metadata: serde_json::Value,
}

/// Paystack wraps every response in a status envelope
#[derive(Deserialize)]
struct Envelope<T> {
    status: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct InitializeData {
    authorization_url: String,
}

#[derive(Deserialize)]
struct VerifyData {
    status: String,
}

/// Paystack client wrapper
pub struct PaystackGateway {
    client: reqwest::Client,
    config: PaystackConfig,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Ok(Self::new(PaystackConfig::from_env()?))
    }

    /// Initialize a transaction and return the authorization URL
    pub async fn create_checkout(
        &self,
        request: &CreateCheckoutRequest,
    ) -> Result<CheckoutRedirect, ProviderError> {
        let url = format!("{}/transaction/initialize", self.config.base_url);
        let body = InitializeBody {
            email: request.email.as_str(),
            amount: request.amount_minor,
            currency: request.currency.as_str(),
            callback_url: &request.success_url,
            metadata: serde_json::json!({
                "creator_id": request.creator.as_str(),
                "interval": request.interval.as_str(),
                "view_id": request.view_id.as_ref().map(|v| v.as_str().to_string()),
            }),
        };

        let envelope: Envelope<InitializeData> = self
            .client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if !envelope.status {
            return Err(ProviderError::Rejected(
                envelope.message.unwrap_or_else(|| "initialize declined".into()),
            ));
        }
        let data = envelope
            .data
            .ok_or_else(|| ProviderError::InvalidResponse("initialize returned no data".into()))?;

        Ok(CheckoutRedirect {
            redirect_url: data.authorization_url,
        })
    }

    /// Verify a returned reference. Safe to call repeatedly.
    pub async fn verify_payment(
        &self,
        reference: &GatewayReference,
    ) -> Result<PaymentVerification, ProviderError> {
        let url = format!(
            "{}/transaction/verify/{}",
            self.config.base_url,
            reference.as_str()
        );

        let envelope: Envelope<VerifyData> = self
            .client
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if !envelope.status {
            return Err(ProviderError::Rejected(
                envelope.message.unwrap_or_else(|| "verify declined".into()),
            ));
        }
        let data = envelope
            .data
            .ok_or_else(|| ProviderError::InvalidResponse("verify returned no data".into()))?;

        Ok(PaymentVerification {
            verified: data.status == "success",
            status: data.status,
        })
    }
}
