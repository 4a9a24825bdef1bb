//! Fee-Split Calculator
//!
//! Pure, total fee math: given a published price, the creator's fee-sharing
//! policy and the applicable rates, derive who pays what. No I/O, no state.
//!
//! Under `split`, the two half-rate fees are rounded independently on
//! purpose. The total fee is their sum, not a single rounded figure, so
//! rounding drift never accumulates on one side.

use serde::{Deserialize, Serialize};

use crate::money::{round_half_up, BPS_SCALE, Currency, FeeRate, Price};

/// Which party bears the platform service fee.
///
/// Exactly one policy is active per quote; it is creator-owned
/// configuration, read-only to the payer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeSplitPolicy {
    /// Creator bears the full fee; the payer pays exactly the listed price
    Absorb,
    /// Payer bears the full fee, grossed up so the creator nets the listed price
    PassToSubscriber,
    /// Each side pays half the total rate, rounded independently
    Split,
}

impl FeeSplitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absorb => "absorb",
            Self::PassToSubscriber => "pass_to_subscriber",
            Self::Split => "split",
        }
    }
}

/// Derived payer/payee breakdown for one quote. Never persisted.
///
/// Invariant: `subscriber_pays == creator_receives + total_fee`, and under
/// `split`, `subscriber_fee + creator_fee == total_fee`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// What the subscriber is charged, minor units
    pub subscriber_pays: u64,

    /// What the creator nets, minor units
    pub creator_receives: u64,

    /// Fee portion borne by the subscriber
    pub subscriber_fee: u64,

    /// Fee portion borne by the creator
    pub creator_fee: u64,

    /// Total platform fee on this transaction
    pub total_fee: u64,

    /// Applied rate (base plus any cross-border buffer), as a percentage
    pub fee_rate_percent: f64,

    /// Currency of every amount above
    pub currency: Currency,
}

/// Compute the fee split for one purchase.
///
/// Pure and total: there is no error path. `Price` construction caps
/// amounts at `Price::MAX_MINOR`, so every derived amount here fits `u64`
/// even when grossing up at `FeeRate::MAX`. A cross-border buffer, when
/// present, is added on top of the base rate and accrues to the side that
/// bears the base fee under the active policy; under `split` it accrues
/// wholly to the subscriber side, never split independently.
pub fn quote(
    price: &Price,
    policy: FeeSplitPolicy,
    rate: FeeRate,
    cross_border_buffer: Option<FeeRate>,
) -> FeeQuote {
    let buffer = cross_border_buffer.unwrap_or(FeeRate::ZERO);
    let applied = rate.saturating_add(buffer);
    let amount = u128::from(price.minor());
    let scale = u128::from(BPS_SCALE);

    match policy {
        FeeSplitPolicy::Absorb => {
            let creator_receives =
                round_half_up(amount * (scale - u128::from(applied.bps())), scale);
            let total_fee = price.minor() - creator_receives;
            FeeQuote {
                subscriber_pays: price.minor(),
                creator_receives,
                subscriber_fee: 0,
                creator_fee: total_fee,
                total_fee,
                fee_rate_percent: applied.as_percent(),
                currency: price.currency().clone(),
            }
        }
        FeeSplitPolicy::PassToSubscriber => {
            // Gross up so the creator's net is never touched by rounding
            let subscriber_pays =
                round_half_up(amount * scale, scale - u128::from(applied.bps()));
            let total_fee = subscriber_pays - price.minor();
            FeeQuote {
                subscriber_pays,
                creator_receives: price.minor(),
                subscriber_fee: total_fee,
                creator_fee: 0,
                total_fee,
                fee_rate_percent: applied.as_percent(),
                currency: price.currency().clone(),
            }
        }
        FeeSplitPolicy::Split => {
            // Half-rate fees, each rounded on its own
            let subscriber_half = round_half_up(amount * u128::from(rate.bps()), 2 * scale);
            let creator_half = round_half_up(amount * u128::from(rate.bps()), 2 * scale);
            let buffer_fee = round_half_up(amount * u128::from(buffer.bps()), scale);

            let subscriber_fee = subscriber_half + buffer_fee;
            let creator_fee = creator_half;
            FeeQuote {
                subscriber_pays: price.minor() + subscriber_fee,
                creator_receives: price.minor() - creator_fee,
                subscriber_fee,
                creator_fee,
                total_fee: subscriber_fee + creator_fee,
                fee_rate_percent: applied.as_percent(),
                currency: price.currency().clone(),
            }
        }
    }
}
