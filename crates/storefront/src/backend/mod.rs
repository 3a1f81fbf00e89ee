//! Client for the order and delivery-zone backend.
//!
//! The backend owns orders, railway stations, pickup locations and the
//! delivery-zone directory. This service only reads the directories and
//! forwards validated orders.
//!
//! # Endpoints
//!
//! ```text
//! GET  /api/delivery/cities/{postalCode}  - city in the delivery corridor, 404 otherwise
//! GET  /api/railway-stations?lang=        - { data: Station[] }
//! GET  /api/delivery/pickup-locations     - PickupLocation[]
//! POST /api/orders                        - create an order
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub(crate) use client::directory_url;
pub use types::{
    OrderConfirmation, OrderCustomer, OrderDelivery, OrderItem, OrderPayload, PaymentMethod,
    PickupLocation, RailwayStation,
};

use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// No backend URL is configured.
    #[error("Delivery backend is not configured")]
    NotConfigured,
}

impl BackendError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Url(_) | Self::NotConfigured => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let server = BackendError::Api {
            status: 503,
            message: String::new(),
        };
        let throttled = BackendError::Api {
            status: 429,
            message: String::new(),
        };
        let rejected = BackendError::Api {
            status: 400,
            message: String::new(),
        };
        assert!(server.is_transient());
        assert!(throttled.is_transient());
        assert!(!rejected.is_transient());
        assert!(BackendError::Parse("eof".to_string()).is_transient());
        assert!(!BackendError::NotConfigured.is_transient());
    }
}
