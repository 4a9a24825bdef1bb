//! # checkout-gateways
//!
//! Concrete payment-provider adapters behind the `PaymentProvider` seam:
//! Stripe hosted Checkout for `Gateway::Primary` and a Paystack-style
//! REST processor for `Gateway::Regional`. The `ProviderRegistry` is the
//! single dispatch point on gateway identity; no other code branches on
//! which vendor a creator is provisioned with.

pub mod primary;
pub mod regional;
pub mod registry;

pub use primary::StripeGateway;
pub use regional::{PaystackConfig, PaystackGateway};
pub use registry::ProviderRegistry;
