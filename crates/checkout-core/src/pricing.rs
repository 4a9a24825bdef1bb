//! Published Pricing
//!
//! The creator-owned configuration a visitor checks out against. Read-only
//! to the payer; fetched once and treated as immutable for the session.

use serde::{Deserialize, Serialize};

use crate::fees::FeeSplitPolicy;
use crate::money::{FeeRate, Price};
use crate::payer::CountryCode;
use crate::router::Gateway;

/// Opaque creator/profile identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatorId(String);

impl CreatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CreatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recurring billing interval
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Monthly,
    Yearly,
}

impl BillingInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// A creator's published subscription offer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublishedPricing {
    /// Base subscription price
    pub price: Price,

    /// Billing cadence
    pub interval: BillingInterval,

    /// Who bears the platform fee
    pub policy: FeeSplitPolicy,

    /// Base platform fee rate
    pub rate: FeeRate,

    /// Extra rate applied on cross-border transactions
    pub cross_border_buffer: FeeRate,

    /// Country the creator settles in
    pub settlement_country: CountryCode,

    /// The one gateway this creator is provisioned on
    pub gateway: Gateway,
}

impl PublishedPricing {
    /// A zero or unset price is not purchasable; submit guards on this
    pub fn is_payable(&self) -> bool {
        !self.price.is_zero()
    }

    /// The buffer to quote with for a given route, if any
    pub fn buffer_for(&self, cross_border: bool) -> Option<FeeRate> {
        cross_border.then_some(self.cross_border_buffer)
    }
}
