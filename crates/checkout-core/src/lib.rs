//! # checkout-core
//!
//! Pure domain layer for the creator subscription checkout: integer money
//! primitives, the fee-split calculator, the gateway router and the payer
//! context. No I/O and no async; everything here is deterministic and
//! directly unit-testable.
//!
//! ```text
//! Price + FeeSplitPolicy + FeeRate ──▶ quote() ──▶ FeeQuote
//!                                            │
//! payer country vs settlement country ──▶ select_gateway() ──▶ GatewayRoute
//! ```
//!
//! The orchestrator in `checkout-flow` composes these with the external
//! payment and analytics services.

pub mod error;
pub mod fees;
pub mod money;
pub mod payer;
pub mod pricing;
pub mod router;

pub use error::{CoreError, Result};
pub use fees::{quote, FeeQuote, FeeSplitPolicy};
pub use money::{Currency, FeeRate, Price};
pub use payer::{CountryCode, Email, PayerContext};
pub use pricing::{BillingInterval, CreatorId, PublishedPricing};
pub use router::{select_gateway, CurrencyMode, Gateway, GatewayRoute};
