//! Shared Application State

use std::sync::Arc;

use checkout_core::{CreatorId, PublishedPricing};
use checkout_flow::{FlowConfig, PaymentProvider};

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub creator: CreatorId,
    pub pricing: PublishedPricing,
    pub flow: FlowConfig,
    pub provider: Arc<dyn PaymentProvider>,
}
