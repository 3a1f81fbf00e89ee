//! Health check handlers.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::services::crm_queue::CrmQueueStats;
use crate::state::AppState;

/// Liveness check. Returns 200 if the server is running.
pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub status: &'static str,
    /// `remote` when a backend is configured, `static` otherwise.
    pub city_directory: &'static str,
    pub crm: Option<CrmQueueStats>,
}

/// Readiness check with CRM queue counters.
///
/// Nothing this service depends on is required for it to answer, so
/// readiness is always `ok`; the body shows what is configured.
pub async fn readiness(State(state): State<AppState>) -> Json<Readiness> {
    Json(Readiness {
        status: "ok",
        city_directory: if state.backend().is_some() {
            "remote"
        } else {
            "static"
        },
        crm: state.crm_stats(),
    })
}
