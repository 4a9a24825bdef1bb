//! Checkout HTTP Server
//!
//! Axum-based service exposing the fee-split quote, hosted checkout
//! creation and payment verification over REST. One server instance
//! serves one creator's published pricing, loaded from the environment.

mod handlers;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_core::{
    BillingInterval, CountryCode, CreatorId, Currency, FeeRate, FeeSplitPolicy, Gateway, Price,
    PublishedPricing,
};
use checkout_flow::FlowConfig;
use checkout_gateways::ProviderRegistry;

use crate::handlers::{create_checkout, health_check, quote_handler, verify_checkout};
use crate::state::AppState;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Build the creator's published offer from the environment
fn pricing_from_env() -> anyhow::Result<(CreatorId, PublishedPricing)> {
    let creator = CreatorId::new(env_or("CREATOR_ID", "creator-demo"));

    let minor: u64 = env_or("PRICE_MINOR", "1000")
        .parse()
        .context("PRICE_MINOR must be an integer amount in minor units")?;
    let currency = Currency::parse(&env_or("CURRENCY", "USD"))
        .context("CURRENCY must be a three-letter code")?;

    let interval = match env_or("BILLING_INTERVAL", "monthly").as_str() {
        "monthly" => BillingInterval::Monthly,
        "yearly" => BillingInterval::Yearly,
        other => anyhow::bail!("unknown BILLING_INTERVAL: {}", other),
    };

    let policy = match env_or("FEE_POLICY", "absorb").as_str() {
        "absorb" => FeeSplitPolicy::Absorb,
        "pass_to_subscriber" => FeeSplitPolicy::PassToSubscriber,
        "split" => FeeSplitPolicy::Split,
        other => anyhow::bail!("unknown FEE_POLICY: {}", other),
    };

    let rate = FeeRate::from_bps(
        env_or("FEE_RATE_BPS", "900")
            .parse()
            .context("FEE_RATE_BPS must be an integer")?,
    )
    .context("FEE_RATE_BPS out of range")?;

    let cross_border_buffer = FeeRate::from_bps(
        env_or("CROSS_BORDER_BUFFER_BPS", "150")
            .parse()
            .context("CROSS_BORDER_BUFFER_BPS must be an integer")?,
    )
    .context("CROSS_BORDER_BUFFER_BPS out of range")?;

    let settlement_country = CountryCode::parse(&env_or("SETTLEMENT_COUNTRY", "US"))
        .context("SETTLEMENT_COUNTRY must be a two-letter code")?;

    let gateway = match env_or("GATEWAY", "primary").as_str() {
        "primary" => Gateway::Primary,
        "regional" => Gateway::Regional,
        other => anyhow::bail!("unknown GATEWAY: {}", other),
    };

    let pricing = PublishedPricing {
        price: Price::new(minor, currency)
            .context("PRICE_MINOR exceeds the largest supported amount")?,
        interval,
        policy,
        rate,
        cross_border_buffer,
        settlement_country,
        gateway,
    };

    Ok((creator, pricing))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let (creator, pricing) = pricing_from_env()?;
    tracing::info!(
        creator = %creator,
        gateway = %pricing.gateway,
        price_minor = pricing.price.minor(),
        "loaded published pricing"
    );

    if !pricing.is_payable() {
        tracing::warn!("price is zero - checkout creation will be refused");
    }

    // Gateway adapters; missing credentials leave a gateway unconfigured
    let provider = Arc::new(ProviderRegistry::from_env());

    let mut flow = FlowConfig::default();
    if let Ok(url) = std::env::var("SUCCESS_URL") {
        flow.success_url = url;
    }
    if let Ok(url) = std::env::var("CANCEL_URL") {
        flow.cancel_url = url;
    }

    // Build application state
    let state = AppState {
        creator,
        pricing,
        flow,
        provider,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/quote", post(quote_handler))
        .route("/api/checkout", post(create_checkout))
        .route("/api/checkout/verify", get(verify_checkout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("checkout server running on http://{}", addr);
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /api/quote           - Fee-split quote");
    tracing::info!("  POST /api/checkout        - Create hosted checkout");
    tracing::info!("  GET  /api/checkout/verify - Verify a returned reference");

    axum::serve(listener, app).await?;

    Ok(())
}
