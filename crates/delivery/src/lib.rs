//! Léman Shop Delivery - checkout delivery rules.
//!
//! Everything in this crate is a pure function of its inputs: no I/O, no
//! clock, no global state. Callers pass `today` and the outcome of postal-code
//! lookups explicitly, which keeps the rules trivially testable and safe to
//! memoise.
//!
//! # Modules
//!
//! - [`city`] - City lookup results and the built-in Coppet–Lausanne directory
//! - [`eligibility`] - Minimum-order rules per delivery type and canton
//! - [`schedule`] - Delivery date generation and default selection
//! - [`memo`] - Memoisation of eligibility on its four inputs
//! - [`checkout`] - Framework-free model of the checkout delivery section
//! - [`messages`] - Localised customer-facing texts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod city;
pub mod eligibility;
pub mod memo;
pub mod messages;
pub mod rules;
pub mod schedule;

pub use checkout::{DateNotOffered, DeliveryCheckout, LookupTicket};
pub use city::{CityLookupResult, LookupOutcome, corridor_city};
pub use eligibility::{
    CartError, CartSnapshot, EligibilityReason, EligibilityResult, Region, evaluate,
};
pub use memo::{EligibilityKey, EligibilityMemo};
pub use rules::DeliveryRules;
pub use schedule::{DateOption, DateSchedule, allowed_weekdays, generate_dates, suggest_default};
