//! HTTP Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use checkout_attribution::ViewId;
use checkout_core::{
    quote, select_gateway, CountryCode, CurrencyMode, Email, FeeQuote, Gateway, GatewayRoute,
};
use checkout_flow::{
    CreateCheckoutRequest, GatewayReference, PaymentVerification, ProviderError,
};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub creator: String,
    pub gateway: Gateway,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub payer_country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub gateway: Gateway,
    pub currency_mode: CurrencyMode,
    pub quote: FeeQuote,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    #[serde(default)]
    pub payer_country: Option<String>,
    #[serde(default)]
    pub view_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub redirect_url: String,
    pub gateway: Gateway,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub gateway: Gateway,
    pub reference: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// A malformed country code is the same as an unresolved one: domestic.
fn parse_country(raw: Option<&str>) -> Option<CountryCode> {
    raw.and_then(|c| CountryCode::parse(c).ok())
}

fn route_and_quote(state: &AppState, payer_country: Option<&CountryCode>) -> (GatewayRoute, FeeQuote) {
    let route = select_gateway(
        state.pricing.gateway,
        payer_country,
        &state.pricing.settlement_country,
    );
    let fee_quote = quote(
        &state.pricing.price,
        state.pricing.policy,
        state.pricing.rate,
        state.pricing.buffer_for(route.is_cross_border()),
    );
    (route, fee_quote)
}

fn provider_error(e: &ProviderError, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        ProviderError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        creator: state.creator.to_string(),
        gateway: state.pricing.gateway,
    })
}

/// Quote the fee split for a prospective payer
pub async fn quote_handler(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Json<QuoteResponse> {
    let country = parse_country(payload.payer_country.as_deref());
    let (route, fee_quote) = route_and_quote(&state, country.as_ref());

    Json(QuoteResponse {
        gateway: route.gateway,
        currency_mode: route.currency_mode,
        quote: fee_quote,
    })
}

/// Open a hosted checkout and return the redirect target
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let email = Email::parse(&payload.email).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "A valid email address is required".into(),
                code: "INVALID_EMAIL".into(),
            }),
        )
    })?;

    if !state.pricing.is_payable() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "This subscription has no price set".into(),
                code: "PRICE_NOT_SET".into(),
            }),
        ));
    }

    let country = parse_country(payload.payer_country.as_deref());
    let (route, fee_quote) = route_and_quote(&state, country.as_ref());

    let request = CreateCheckoutRequest {
        creator: state.creator.clone(),
        amount_minor: fee_quote.subscriber_pays,
        currency: state.pricing.price.currency().clone(),
        interval: state.pricing.interval,
        email,
        gateway: route.gateway,
        view_id: payload.view_id.map(ViewId::from_string),
        success_url: state.flow.success_url.clone(),
        cancel_url: state.flow.cancel_url.clone(),
    };

    let redirect = state.provider.create_checkout(&request).await.map_err(|e| {
        tracing::error!("checkout creation failed: {}", e);
        provider_error(&e, "CHECKOUT_ERROR")
    })?;

    Ok(Json(CheckoutResponse {
        redirect_url: redirect.redirect_url,
        gateway: route.gateway,
    }))
}

/// Ask the gateway whether a returned reference was actually paid
pub async fn verify_checkout(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<PaymentVerification>, (StatusCode, Json<ErrorResponse>)> {
    let reference = GatewayReference::from_string(query.reference);

    let verification = state
        .provider
        .verify_payment(query.gateway, &reference)
        .await
        .map_err(|e| {
            tracing::error!("verification failed: {}", e);
            provider_error(&e, "VERIFY_ERROR")
        })?;

    Ok(Json(verification))
}
