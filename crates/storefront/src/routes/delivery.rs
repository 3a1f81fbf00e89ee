//! Delivery route handlers.
//!
//! Eligibility and dates are computed from the same rules the checkout
//! submission re-checks. Messages and labels default to French.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use lemanshop_core::{Canton, DeliveryType, Language, PostalCodeInput};
use lemanshop_delivery::{
    CartSnapshot, CityLookupResult, DateOption, EligibilityResult, LookupOutcome,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::{BackendError, PickupLocation, RailwayStation};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Parse an optional canton code. Blank means "not chosen yet".
fn parse_canton(field: &str, raw: Option<&str>) -> Result<Option<Canton>> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(code) => Canton::from_code(code)
            .map(Some)
            .ok_or_else(|| AppError::field(field, "We only deliver to Geneva and Vaud")),
    }
}

// =============================================================================
// Eligibility
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EligibilityRequest {
    pub delivery_type: Option<String>,
    pub canton: Option<String>,
    pub postal_code: Option<String>,
    pub cart_total: Decimal,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    #[serde(flatten)]
    pub result: EligibilityResult,
    /// The city the postal code resolved to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<CityLookupResult>,
}

/// Evaluate delivery eligibility for a cart.
///
/// An unknown delivery type is not an error: the result is simply invalid.
/// The postal code is only resolved for home delivery in Vaud.
#[instrument(skip(state, request), fields(delivery_type = ?request.delivery_type))]
pub async fn eligibility(
    State(state): State<AppState>,
    Json(request): Json<EligibilityRequest>,
) -> Result<Json<EligibilityResponse>> {
    let language = Language::from_tag_or_default(request.lang.as_deref());
    let delivery_type = request
        .delivery_type
        .as_deref()
        .and_then(DeliveryType::from_wire);
    let canton = parse_canton("canton", request.canton.as_deref())?;
    let cart = CartSnapshot::new(request.cart_total)
        .map_err(|e| AppError::field("cartTotal", e.to_string()))?;

    let outcome = match (delivery_type, canton, request.postal_code.as_deref()) {
        (Some(DeliveryType::Address), Some(Canton::VD), Some(raw)) => {
            state.resolver().resolve_input(raw).await
        }
        _ => None,
    };
    let city = outcome.as_ref().and_then(LookupOutcome::city);

    let result = state
        .rules()
        .evaluate_in(delivery_type, canton, city, cart, language);

    Ok(Json(EligibilityResponse {
        result,
        city: city.cloned(),
    }))
}

// =============================================================================
// Dates
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatesQuery {
    #[serde(rename = "type")]
    pub delivery_type: Option<String>,
    pub canton: Option<String>,
    pub selected: Option<NaiveDate>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelledDate {
    #[serde(flatten)]
    pub option: DateOption,
    pub label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesResponse {
    pub options: Vec<LabelledDate>,
    /// Date to select if the current selection is missing or no longer offered.
    pub suggested: Option<NaiveDate>,
}

/// Offered delivery dates for a delivery type.
///
/// An unknown or missing type yields an empty schedule.
#[instrument(skip(state, query), fields(delivery_type = ?query.delivery_type))]
pub async fn dates(
    State(state): State<AppState>,
    Query(query): Query<DatesQuery>,
) -> Result<Json<DatesResponse>> {
    let language = Language::from_tag_or_default(query.lang.as_deref());
    let canton = parse_canton("canton", query.canton.as_deref())?;

    let Some(delivery_type) = query.delivery_type.as_deref().and_then(DeliveryType::from_wire)
    else {
        return Ok(Json(DatesResponse {
            options: Vec::new(),
            suggested: None,
        }));
    };

    let schedule = state
        .rules()
        .schedule(delivery_type, canton, state.today(), query.selected);

    let options = schedule
        .options
        .into_iter()
        .map(|option| LabelledDate {
            label: option.label(language),
            option,
        })
        .collect();

    Ok(Json(DatesResponse {
        options,
        suggested: schedule.suggested,
    }))
}

// =============================================================================
// Directories
// =============================================================================

/// Resolve a postal code to a served city.
#[instrument(skip(state))]
pub async fn city(
    State(state): State<AppState>,
    Path(postal_code): Path<String>,
) -> Result<Json<CityLookupResult>> {
    let postal_code = match PostalCodeInput::classify(&postal_code) {
        PostalCodeInput::Complete(code) => code,
        PostalCodeInput::Invalid(e) => return Err(AppError::BadRequest(e.to_string())),
        PostalCodeInput::Empty | PostalCodeInput::Partial => {
            return Err(AppError::BadRequest(
                "Postal codes have 4 digits".to_string(),
            ));
        }
    };

    match state.resolver().resolve(postal_code).await {
        LookupOutcome::Resolved(city) => Ok(Json(city)),
        LookupOutcome::NotServed => Err(AppError::NotFound(format!(
            "We do not deliver to {postal_code}"
        ))),
        LookupOutcome::Unavailable => Err(AppError::LookupUnavailable),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LangQuery {
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub data: Vec<RailwayStation>,
}

/// Railway stations served by station delivery.
#[instrument(skip(state, query))]
pub async fn railway_stations(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<Json<StationsResponse>> {
    let language = Language::from_tag_or_default(query.lang.as_deref());
    let backend = state.backend().ok_or(BackendError::NotConfigured)?;
    let stations = backend.railway_stations(language).await?;
    Ok(Json(StationsResponse {
        data: stations.as_ref().clone(),
    }))
}

/// Stores where orders can be picked up.
#[instrument(skip(state))]
pub async fn pickup_locations(State(state): State<AppState>) -> Result<Json<Vec<PickupLocation>>> {
    let backend = state.backend().ok_or(BackendError::NotConfigured)?;
    let locations = backend.pickup_locations().await?;
    Ok(Json(locations.as_ref().clone()))
}
