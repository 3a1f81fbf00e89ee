//! Léman Shop Core - Shared value types.
//!
//! This crate provides the types shared by every Léman Shop component:
//! - `delivery` - Framework-free delivery eligibility and scheduling rules
//! - `storefront` - HTTP service (checkout, postal-code lookups, CRM sync)
//!
//! # Architecture
//!
//! The core crate contains only types and parsing - no I/O, no HTTP clients,
//! no async runtime. Every input that crosses a trust boundary (postal codes,
//! emails, phone numbers, language tags) is parsed into one of these types
//! before the rules see it.
//!
//! # Modules
//!
//! - [`types`] - Newtypes for postal codes, cantons, delivery types, prices,
//!   emails, phones, languages and ids

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
