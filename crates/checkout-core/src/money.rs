//! Money Primitives
//!
//! All monetary math is integer-only in minor currency units (cents,
//! kobo, ...). Rates are basis points; rounding is half-up and applied
//! once per derived amount.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Basis points in 100% (10000 bps = 100%)
pub const BPS_SCALE: u32 = 10_000;

/// ISO 4217 currency code (three ASCII letters, stored uppercase)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Parse and validate a currency code
    pub fn parse(code: impl AsRef<str>) -> Result<Self> {
        let code = code.as_ref().trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(CoreError::InvalidCurrency(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative amount in minor units, paired with its currency.
///
/// Amounts are `u64`, so a negative price is unrepresentable rather than
/// validated at call time, and construction caps them at [`Self::MAX_MINOR`]
/// so every amount derived from a price fits `u64` even at the maximum
/// fee rate. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    minor: u64,
    currency: Currency,
}

impl Price {
    /// Largest constructible amount: 10^12 minor units. Keeps the
    /// grossed-up pass-through total within `u64` even at `FeeRate::MAX`.
    pub const MAX_MINOR: u64 = 1_000_000_000_000;

    pub fn new(minor: u64, currency: Currency) -> Result<Self> {
        if minor > Self::MAX_MINOR {
            return Err(CoreError::AmountOutOfRange(minor));
        }
        Ok(Self { minor, currency })
    }

    /// Amount in minor units
    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.minor, self.currency)
    }
}

/// A fee rate in basis points, strictly below 100%
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeeRate(u32);

impl FeeRate {
    pub const ZERO: Self = Self(0);

    /// Highest representable rate (99.99%)
    pub const MAX: Self = Self(BPS_SCALE - 1);

    pub fn from_bps(bps: u32) -> Result<Self> {
        if bps >= BPS_SCALE {
            return Err(CoreError::RateOutOfRange(bps));
        }
        Ok(Self(bps))
    }

    /// Parse a percentage (e.g. `9.0` for 9%), rounded to the nearest bps
    pub fn from_percent(percent: f64) -> Result<Self> {
        if !percent.is_finite() || percent < 0.0 {
            return Err(CoreError::InvalidPercent(percent));
        }
        let bps = (percent * 100.0).round();
        if bps >= f64::from(BPS_SCALE) {
            return Err(CoreError::RateOutOfRange(bps as u32));
        }
        Ok(Self(bps as u32))
    }

    pub fn bps(self) -> u32 {
        self.0
    }

    pub fn as_percent(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Combine a base rate with a buffer, clamped into validity
    pub fn saturating_add(self, other: Self) -> Self {
        Self((self.0 + other.0).min(BPS_SCALE - 1))
    }
}

impl std::fmt::Display for FeeRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

/// Integer division rounded half-up. Denominator must be non-zero; the
/// `Price` amount cap keeps every quotient taken here within `u64`.
pub(crate) fn round_half_up(numerator: u128, denominator: u128) -> u64 {
    ((2 * numerator + denominator) / (2 * denominator)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse() {
        let usd = Currency::parse("usd").unwrap();
        assert_eq!(usd.as_str(), "USD");
        assert!(Currency::parse("US").is_err());
        assert!(Currency::parse("U5D").is_err());
        assert!(Currency::parse("").is_err());
    }

    #[test]
    fn test_rate_bounds() {
        assert!(FeeRate::from_bps(9_999).is_ok());
        assert!(FeeRate::from_bps(10_000).is_err());
        assert_eq!(FeeRate::from_percent(9.0).unwrap().bps(), 900);
        assert!(matches!(
            FeeRate::from_percent(-1.0),
            Err(CoreError::InvalidPercent(p)) if p == -1.0
        ));
        assert!(matches!(
            FeeRate::from_percent(f64::NAN),
            Err(CoreError::InvalidPercent(p)) if p.is_nan()
        ));
        assert!(matches!(
            FeeRate::from_percent(100.0),
            Err(CoreError::RateOutOfRange(10_000))
        ));
    }

    #[test]
    fn test_price_amount_cap() {
        let usd = Currency::parse("USD").unwrap();
        assert!(Price::new(Price::MAX_MINOR, usd.clone()).is_ok());
        assert!(matches!(
            Price::new(Price::MAX_MINOR + 1, usd),
            Err(CoreError::AmountOutOfRange(_))
        ));
    }

    #[test]
    fn test_saturating_add_clamps() {
        let base = FeeRate::from_bps(9_900).unwrap();
        let buffer = FeeRate::from_bps(500).unwrap();
        assert_eq!(base.saturating_add(buffer), FeeRate::MAX);
    }

    #[test]
    fn test_round_half_up() {
        // 10.5 rounds up, 10.4 rounds down
        assert_eq!(round_half_up(105, 10), 11);
        assert_eq!(round_half_up(104, 10), 10);
        assert_eq!(round_half_up(0, 10), 0);
    }
}
