//! Delivery eligibility engine.
//!
//! Delivery is always free. What varies is whether the cart qualifies:
//!
//! | delivery type     | canton | postal code            | minimum |
//! |-------------------|--------|------------------------|---------|
//! | `PICKUP`          | -      | -                      | 0       |
//! | `RAILWAY_STATION` | -      | -                      | 0       |
//! | `ADDRESS`         | GE     | -                      | 200     |
//! | `ADDRESS`         | VD     | in the corridor        | 0       |
//! | `ADDRESS`         | VD     | elsewhere / unresolved | 200     |
//! | `ADDRESS`         | none   | -                      | 200     |
//!
//! An unknown delivery type is never valid.

use lemanshop_core::{Canton, DeliveryType, Language, Price};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::city::CityLookupResult;
use crate::messages;
use crate::rules::DeliveryRules;

/// Error constructing a [`CartSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("cart total cannot be negative (got {0})")]
    Negative(Decimal),
}

/// The cart total seen by the rules. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSnapshot {
    total_price: Decimal,
}

impl CartSnapshot {
    /// Snapshot a cart total.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Negative`] for totals below zero.
    pub fn new(total_price: Decimal) -> Result<Self, CartError> {
        if total_price.is_sign_negative() && !total_price.is_zero() {
            return Err(CartError::Negative(total_price));
        }
        Ok(Self { total_price })
    }

    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_price: Decimal::ZERO,
        }
    }

    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.total_price
    }
}

/// Where a home delivery goes, for minimum-order purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    Geneva,
    /// Vaud outside the Coppet–Lausanne corridor, or an unresolved postal code.
    OtherVaud,
    /// No canton chosen yet.
    Unspecified,
}

/// Which rule produced an [`EligibilityResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum EligibilityReason {
    Pickup,
    RailwayStation,
    /// Home delivery inside the corridor.
    Corridor { city: String },
    MinimumReached { region: Region },
    BelowMinimum { region: Region },
    UnknownDeliveryType,
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    /// Delivery cost. Always zero.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    pub is_valid: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_order_amount: Decimal,
    /// How much the cart is short of the minimum. Zero when valid.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_missing: Decimal,
    pub message: String,
    pub delivery_type: Option<DeliveryType>,
    pub reason: EligibilityReason,
}

impl DeliveryRules {
    /// Evaluate eligibility with English messages.
    #[must_use]
    pub fn evaluate(
        &self,
        delivery_type: Option<DeliveryType>,
        canton: Option<Canton>,
        city: Option<&CityLookupResult>,
        cart: CartSnapshot,
    ) -> EligibilityResult {
        self.evaluate_in(delivery_type, canton, city, cart, Language::En)
    }

    /// Evaluate eligibility, wording the message in `language`.
    ///
    /// `city` is the result of resolving the customer's postal code; pass
    /// `None` when the code is missing, outside the corridor, or the lookup
    /// failed. Only `ADDRESS` + `VD` looks at it.
    #[must_use]
    pub fn evaluate_in(
        &self,
        delivery_type: Option<DeliveryType>,
        canton: Option<Canton>,
        city: Option<&CityLookupResult>,
        cart: CartSnapshot,
        language: Language,
    ) -> EligibilityResult {
        let total = cart.total_price();

        let Some(kind) = delivery_type else {
            return build(
                None,
                false,
                Decimal::ZERO,
                Decimal::ZERO,
                EligibilityReason::UnknownDeliveryType,
                language,
            );
        };

        let region = match kind {
            DeliveryType::Pickup => {
                return free(kind, EligibilityReason::Pickup, language);
            }
            DeliveryType::RailwayStation => {
                return free(kind, EligibilityReason::RailwayStation, language);
            }
            DeliveryType::Address => match (canton, city) {
                (Some(Canton::VD), Some(city)) => {
                    return free(
                        kind,
                        EligibilityReason::Corridor {
                            city: city.name.clone(),
                        },
                        language,
                    );
                }
                (Some(Canton::VD), None) => Region::OtherVaud,
                (Some(Canton::GE), _) => Region::Geneva,
                (None, _) => Region::Unspecified,
            },
        };

        let minimum = self.address_minimum_order;
        if total >= minimum {
            build(
                Some(kind),
                true,
                minimum,
                Decimal::ZERO,
                EligibilityReason::MinimumReached { region },
                language,
            )
        } else {
            build(
                Some(kind),
                false,
                minimum,
                minimum - total,
                EligibilityReason::BelowMinimum { region },
                language,
            )
        }
    }
}

/// Evaluate eligibility under the default rules.
#[must_use]
pub fn evaluate(
    delivery_type: Option<DeliveryType>,
    canton: Option<Canton>,
    city: Option<&CityLookupResult>,
    cart: CartSnapshot,
) -> EligibilityResult {
    DeliveryRules::default().evaluate(delivery_type, canton, city, cart)
}

fn free(kind: DeliveryType, reason: EligibilityReason, language: Language) -> EligibilityResult {
    build(Some(kind), true, Decimal::ZERO, Decimal::ZERO, reason, language)
}

fn build(
    delivery_type: Option<DeliveryType>,
    is_valid: bool,
    minimum: Decimal,
    missing: Decimal,
    reason: EligibilityReason,
    language: Language,
) -> EligibilityResult {
    let message = messages::eligibility(
        &reason,
        Price::chf(minimum),
        Price::chf(missing),
        language,
    );
    EligibilityResult {
        cost: Decimal::ZERO,
        is_valid,
        minimum_order_amount: minimum,
        amount_missing: missing,
        message,
        delivery_type,
        reason,
    }
}
