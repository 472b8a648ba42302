//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// The catalog quotes prices in the currency's standard unit (dollars, not
/// cents), matching the wire format of the Shutterbay API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a USD price.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Apply a percentage discount, rounded to two decimal places.
    ///
    /// Percentages outside `0..=100` are treated as no discount; the catalog
    /// should never produce them but the admin form does not prevent them.
    #[must_use]
    pub fn with_discount(self, percent: Decimal) -> Self {
        if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return self;
        }
        let factor = (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED;
        Self {
            amount: (self.amount * factor).round_dp(2),
            currency_code: self.currency_code,
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_display() {
        assert_eq!(Price::usd(dec!(19.99)).display(), "$19.99");
        assert_eq!(Price::usd(dec!(5)).display(), "$5.00");
    }

    #[test]
    fn test_with_discount() {
        let price = Price::usd(dec!(100));
        assert_eq!(price.with_discount(dec!(25)).amount, dec!(75.00));
        // Out-of-range percentages leave the price untouched
        assert_eq!(price.with_discount(dec!(0)).amount, dec!(100));
        assert_eq!(price.with_discount(dec!(150)).amount, dec!(100));
    }

    #[test]
    fn test_discount_rounds_to_cents() {
        let price = Price::usd(dec!(9.99));
        assert_eq!(price.with_discount(dec!(10)).amount, dec!(8.99));
    }
}
