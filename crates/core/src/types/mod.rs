//! Core types for Léman Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod language;
pub mod location;
pub mod phone;
pub mod postal_code;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use language::Language;
pub use location::{Canton, DeliveryType};
pub use phone::{Phone, PhoneError};
pub use postal_code::{PostalCode, PostalCodeError, PostalCodeInput};
pub use price::{CurrencyCode, Price};
