//! # checkout-flow
//!
//! The checkout orchestration state machine: composes the fee-split
//! calculator and gateway router from `checkout-core` with the
//! attribution client and the external payment gateway to drive one
//! purchase from intent to verified payment.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   CheckoutOrchestrator                       │
//! │  ┌──────────┐  ┌─────────┐  ┌─────────────┐  ┌────────────┐  │
//! │  │ fee math │  │ routing │  │ attribution │  │ geo cache  │  │
//! │  └──────────┘  └─────────┘  └─────────────┘  └────────────┘  │
//! │         │                                                    │
//! │         ▼                                                    │
//! │  PaymentProvider (create_checkout / verify_payment)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The forward path suspends across a full browser navigation at
//! `Redirecting`; re-entry happens through `resume_from_return`, which
//! re-derives truth from `verify_payment` instead of any locally cached
//! success flag. Verification failures are treated as possibly-charged
//! and only exit via explicit retry or support escalation.

pub mod confirm;
pub mod error;
pub mod geo;
pub mod orchestrator;
pub mod provider;
pub mod return_url;
pub mod session;

pub use confirm::{ConfirmedFlagStore, MemoryConfirmedFlags};
pub use error::{FieldError, FlowError, Result};
pub use geo::{CachedGeoLocator, GeoError, GeoLocator, HttpGeoLocator};
pub use orchestrator::{CheckoutOrchestrator, FlowConfig};
pub use provider::{
    CheckoutRedirect, CreateCheckoutRequest, PaymentProvider, PaymentVerification, ProviderError,
};
pub use return_url::{parse_return_query, ReturnSignal};
pub use session::{CheckoutPhase, CheckoutSession, GatewayReference, PaymentIssue};
