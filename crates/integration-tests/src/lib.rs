//! Integration tests for Léman Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lemanshop-integration-tests
//! ```
//!
//! No external services are needed: the storefront router is driven in
//! process with `tower::ServiceExt::oneshot`, and the order backend and
//! `SendPulse` are replaced by small axum servers on ephemeral ports.
//!
//! # Test Categories
//!
//! - `delivery_api` - Eligibility, dates and directory routes
//! - `checkout_flow` - Order submission against a fake backend
//! - `sendpulse_sync` - CRM client and queue against a fake `SendPulse`

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use chrono::NaiveDate;
use lemanshop_storefront::config::StorefrontConfig;
use lemanshop_storefront::state::{AppState, Clock};
use tower::ServiceExt;
use url::Url;

/// Wednesday, 14 October 2026.
#[must_use]
pub fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

/// Configuration with no backend, no CRM and instant lookup retries.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    let mut config = StorefrontConfig::default();
    config.delivery.lookup_backoff = std::time::Duration::from_millis(1);
    config
}

/// Storefront router for `config`, scheduling from a fixed `today`.
#[must_use]
pub fn storefront(config: StorefrontConfig, today: NaiveDate) -> Router {
    let state = AppState::new(config, Clock::Fixed(today)).unwrap();
    lemanshop_storefront::app(state)
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// Send a request through the router and decode the JSON answer.
///
/// Non-JSON bodies come back as a JSON string.
pub async fn call(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    call(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    router: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    call(router, request).await
}
