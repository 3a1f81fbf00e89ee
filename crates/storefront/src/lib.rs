//! Léman Shop Storefront library.
//!
//! The HTTP service behind the checkout page: delivery eligibility and dates,
//! postal-code lookups, order submission and CRM sync. Exposed as a library
//! so the integration tests can drive the router directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod resolver;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Method, Request, Response, header::CONTENT_TYPE},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{REQUEST_ID_HEADER, request_id_middleware};
use crate::state::AppState;

/// CORS for the SPA. Without a configured origin, no cross-origin access.
fn cors_layer(state: &AppState) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    match &state.config().cors_origin {
        Some(origin) => layer.allow_origin(origin.clone()),
        None => layer,
    }
}

/// Build the application router with its middleware.
///
/// Sentry layers are added by the binary, outermost.
pub fn app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                status = tracing::field::Empty,
                latency_ms = tracing::field::Empty,
            )
        })
        .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
            span.record("status", response.status().as_u16());
            span.record(
                "latency_ms",
                u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            );
            DefaultOnResponse::default().on_response(response, latency, span);
        });

    let cors = cors_layer(&state);

    routes::routes().with_state(state).layer(
        ServiceBuilder::new()
            .layer(trace)
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(cors),
    )
}
