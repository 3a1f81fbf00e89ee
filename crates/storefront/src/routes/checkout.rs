//! Checkout route handler.

use axum::{Extension, Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequestId;
use crate::services::checkout::{self, CheckoutReceipt, CheckoutRequest};
use crate::state::AppState;

/// Submit an order.
///
/// Returns 201 with the backend's order reference and the request id.
/// Field errors come back together as a 422 with a `fields` map.
#[instrument(skip(state, request_id, request), fields(delivery_type = ?request.delivery.delivery_type))]
pub async fn submit(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutReceipt>)> {
    let receipt = checkout::submit(&state, &request, &request_id).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
