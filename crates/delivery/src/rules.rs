//! Tunable parameters of the delivery rules.

use rust_decimal::Decimal;

/// Parameters shared by the eligibility engine and the date scheduler.
///
/// Delivery itself is always free; these values only decide whether an order
/// qualifies and when it can be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRules {
    /// Minimum cart total for home delivery outside the corridor (CHF).
    pub address_minimum_order: Decimal,
    /// Last offered day, counted from today (inclusive).
    pub window_days: u32,
    /// First offered day, counted from today. One day guarantees 24h notice.
    pub notice_days: u32,
}

impl DeliveryRules {
    /// Default minimum order for home delivery (CHF).
    pub const DEFAULT_ADDRESS_MINIMUM: u32 = 200;
    /// Default scheduling window in days.
    pub const DEFAULT_WINDOW_DAYS: u32 = 14;
    /// Default notice in days.
    pub const DEFAULT_NOTICE_DAYS: u32 = 1;
}

impl Default for DeliveryRules {
    fn default() -> Self {
        Self {
            address_minimum_order: Decimal::from(Self::DEFAULT_ADDRESS_MINIMUM),
            window_days: Self::DEFAULT_WINDOW_DAYS,
            notice_days: Self::DEFAULT_NOTICE_DAYS,
        }
    }
}
