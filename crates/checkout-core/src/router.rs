//! Gateway Router
//!
//! Maps creator configuration plus payer geography to a gateway identity
//! and a currency handling mode. Deterministic and side-effect free.
//!
//! A creator is provisioned on exactly one primary gateway at a time, so
//! the real decision here is domestic vs cross-border for fee-buffer
//! purposes. Unresolved geography defaults to domestic: under-charging the
//! buffer is preferred over blocking a sale.

use serde::{Deserialize, Serialize};

use crate::payer::CountryCode;

/// Payment gateway identity.
///
/// The single tagged variant all downstream code dispatches on; provider
/// branching happens here and in the adapter registry, nowhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    /// Cross-border capable hosted checkout (Stripe-provisioned creators)
    Primary,
    /// Regional processor settling in the creator's home currency
    Regional,
}

impl Gateway {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Regional => "regional",
        }
    }

    /// Query parameter carrying the provider reference on redirect return
    pub fn reference_param(self) -> &'static str {
        match self {
            Self::Primary => "session_id",
            Self::Regional => "reference",
        }
    }
}

impl std::fmt::Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the transaction settles relative to the creator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyMode {
    Domestic,
    CrossBorder,
}

/// Result of routing one payer against one creator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRoute {
    pub gateway: Gateway,
    pub currency_mode: CurrencyMode,
}

impl GatewayRoute {
    pub fn is_cross_border(self) -> bool {
        self.currency_mode == CurrencyMode::CrossBorder
    }
}

/// Select the gateway and currency mode for one payer.
///
/// `payer_country` is `None` when detection failed or has not resolved;
/// that case is domestic by policy.
pub fn select_gateway(
    preference: Gateway,
    payer_country: Option<&CountryCode>,
    settlement_country: &CountryCode,
) -> GatewayRoute {
    let currency_mode = match payer_country {
        Some(country) if country != settlement_country => CurrencyMode::CrossBorder,
        _ => CurrencyMode::Domestic,
    };

    GatewayRoute {
        gateway: preference,
        currency_mode,
    }
}
