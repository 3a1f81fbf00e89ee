//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction), added in `main`
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request id (recorded on the span and Sentry scope)
//! 4. CORS for the SPA

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
