//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (francs, not centimes).
    #[serde(with = "rust_decimal::serde::float")]
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

    /// A price in Swiss francs.
    #[must_use]
    pub const fn chf(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::CHF)
    }

    /// Zero Swiss francs.
    #[must_use]
    pub const fn zero() -> Self {
        Self::chf(Decimal::ZERO)
    }
}

impl fmt::Display for Price {
    /// Formats as `200.00 CHF`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {}",
            self.amount.round_dp(2),
            self.currency_code.code()
        )
    }
}

/// ISO 4217 currency codes accepted by the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    CHF,
    EUR,
}

impl CurrencyCode {
    /// Three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::CHF => "CHF",
            Self::EUR => "EUR",
        }
    }
}
