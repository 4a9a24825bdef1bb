//! # checkout-attribution
//!
//! Analytics attribution for the purchase funnel: record one page view per
//! buyer session, then patch monotonic milestones (`reachedPayment`,
//! `startedCheckout`, `completedCheckout`) against it.
//!
//! Everything in this crate is best-effort by contract. The purchase path
//! treats it as observability: failures are logged and swallowed, the view
//! record is issued at most once per mount even under framework
//! double-invoke, and milestone patches are idempotent from the caller's
//! perspective.

pub mod client;
pub mod error;
pub mod funnel;
pub mod http;
pub mod session;

pub use client::{AttributionClient, PageViewApi};
pub use error::{AttributionError, Result};
pub use funnel::{FunnelMilestone, FunnelState, ReferrerMeta, ViewId};
pub use http::{AttributionConfig, HttpPageViewApi};
pub use session::SessionCache;
