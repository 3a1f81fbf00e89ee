//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness
//! GET  /health/ready                            - Readiness + CRM queue counters
//!
//! # Delivery
//! POST /api/delivery/eligibility                - Evaluate eligibility
//! GET  /api/delivery/dates?type=&canton=&selected=&lang= - Date schedule
//! GET  /api/delivery/cities/{postalCode}        - Resolve postal code (404 outside the corridor)
//! GET  /api/delivery/railway-stations?lang=     - Station directory (cached)
//! GET  /api/delivery/pickup-locations           - Pickup locations (cached)
//!
//! # Checkout
//! POST /api/checkout                            - Validate and submit an order
//!
//! # CRM
//! POST /api/crm/contacts                        - Queue a contact for sync (202)
//!
//! # Translations
//! GET  /api/i18n/emails/{lang}                  - Email translation constants
//! ```
//!
//! All bodies are JSON with camelCase keys.

pub mod checkout;
pub mod crm;
pub mod delivery;
pub mod health;
pub mod i18n;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the delivery routes router.
pub fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route("/eligibility", post(delivery::eligibility))
        .route("/dates", get(delivery::dates))
        .route("/cities/{postal_code}", get(delivery::city))
        .route("/railway-stations", get(delivery::railway_stations))
        .route("/pickup-locations", get(delivery::pickup_locations))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/delivery", delivery_routes())
        .route("/api/checkout", post(checkout::submit))
        .route("/api/crm/contacts", post(crm::create_contact))
        .route("/api/i18n/emails/{lang}", get(i18n::email_translations))
}
