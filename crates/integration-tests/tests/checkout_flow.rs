//! Integration tests for checkout submission and backend-backed routes.
//!
//! The order backend is a small axum app that records submitted orders.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use lemanshop_integration_tests::{call, get as get_route, post_json, serve, storefront, test_config, wednesday};
use serde_json::{Value, json};

#[derive(Default)]
struct FakeBackend {
    orders: Mutex<Vec<Value>>,
    city_calls: AtomicUsize,
    station_calls: AtomicUsize,
}

async fn city(State(fake): State<Arc<FakeBackend>>, Path(code): Path<String>) -> Response {
    fake.city_calls.fetch_add(1, Ordering::SeqCst);
    match code.as_str() {
        "1260" => Json(json!({
            "name": "Nyon",
            "postalCode": "1260",
            "zoneId": "la-cote",
            "freeThreshold": 0
        }))
        .into_response(),
        "1002" => (StatusCode::INTERNAL_SERVER_ERROR, "zone service down").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn orders(State(fake): State<Arc<FakeBackend>>, Json(order): Json<Value>) -> Response {
    if order["customer"]["lastName"] == "Reject" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    fake.orders.lock().unwrap().push(order);
    (
        StatusCode::CREATED,
        Json(json!({ "id": "ord_1", "orderNumber": "LS-1001" })),
    )
        .into_response()
}

async fn stations(State(fake): State<Arc<FakeBackend>>) -> Json<Value> {
    fake.station_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": [ { "id": "lausanne", "name": "Lausanne", "platform": "1" } ] }))
}

async fn pickup_locations() -> Json<Value> {
    Json(json!([ { "id": "nyon-shop", "name": "Léman Shop Nyon", "address": "Rue de Rive 3" } ]))
}

/// Storefront wired to a fresh fake backend.
async fn setup() -> (Router, Arc<FakeBackend>) {
    let fake = Arc::new(FakeBackend::default());
    let backend = Router::new()
        .route("/api/delivery/cities/{code}", get(city))
        .route("/api/delivery/pickup-locations", get(pickup_locations))
        .route("/api/railway-stations", get(stations))
        .route("/api/orders", post(orders))
        .with_state(Arc::clone(&fake));
    let url = serve(backend).await;

    let mut config = test_config();
    config.delivery.backend_url = Some(url);
    (storefront(config, wednesday()), fake)
}

fn checkout(delivery: &Value, date: &str, items: &Value) -> Value {
    json!({
        "customer": {
            "firstName": "Anna",
            "lastName": "Muller",
            "email": "anna@example.ch",
            "phone": "+41 79 123 45 67"
        },
        "delivery": delivery,
        "deliveryDate": date,
        "deliveryTimeSlot": "morning",
        "paymentMethod": "TWINT",
        "items": items,
        "lang": "en"
    })
}

fn small_cart() -> Value {
    json!([ { "productId": "gruyere-aop", "name": "Gruyère AOP", "quantity": 2, "unitPrice": 25 } ])
}

// =============================================================================
// Successful submissions
// =============================================================================

#[tokio::test]
async fn test_corridor_address_order_submitted() {
    let (app, fake) = setup().await;

    let delivery = json!({
        "type": "ADDRESS",
        "canton": "VD",
        "postalCode": "1260",
        "city": "Nyon",
        "street": "Rue de Rive 3"
    });
    let (status, body) = post_json(
        &app,
        "/api/checkout",
        &checkout(&delivery, "2026-10-17", &small_cart()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["orderId"], "ord_1");
    assert_eq!(body["orderNumber"], "LS-1001");
    assert_eq!(body["deliveryDate"], "2026-10-17");
    assert_eq!(body["deliverySummary"], "Home delivery, Saturday, 17 October");
    assert_eq!(body["eligibility"]["isValid"], true);
    assert!(body["requestId"].is_string());

    let orders = fake.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order["deliveryType"], "ADDRESS");
    assert_eq!(order["addressDelivery"]["postalCode"], "1260");
    assert_eq!(order["addressDelivery"]["canton"], "VD");
    assert!(order.get("stationDelivery").is_none());
    assert!(order.get("pickupDelivery").is_none());
    assert_eq!(order["deliveryCost"].as_f64(), Some(0.0));
    assert_eq!(order["totalPrice"].as_f64(), Some(50.0));
    assert_eq!(order["deliveryTimeSlot"], "morning");
    assert_eq!(order["paymentMethod"], "TWINT");
    assert_eq!(order["customer"]["phone"], "+41791234567");
}

#[tokio::test]
async fn test_receipt_echoes_request_id() {
    let (app, fake) = setup().await;

    let body = checkout(
        &json!({ "type": "PICKUP", "storeId": "nyon-shop" }),
        "2026-10-17",
        &small_cart(),
    );
    let request = Request::post("/api/checkout")
        .header(CONTENT_TYPE, "application/json")
        .header("x-request-id", "support-42")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, receipt) = call(&app, request).await;

    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["requestId"], "support-42");
    assert_eq!(fake.orders.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_station_order_submitted() {
    let (app, fake) = setup().await;

    let delivery = json!({ "type": "RAILWAY_STATION", "stationId": "lausanne" });
    let (status, _) = post_json(
        &app,
        "/api/checkout",
        &checkout(&delivery, "2026-10-19", &small_cart()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let orders = fake.orders.lock().unwrap();
    assert_eq!(orders[0]["stationDelivery"]["stationId"], "lausanne");
    assert!(orders[0].get("addressDelivery").is_none());
}

// =============================================================================
// Rejected submissions
// =============================================================================

#[tokio::test]
async fn test_geneva_below_minimum_blocks_submission() {
    let (app, fake) = setup().await;

    let delivery = json!({
        "type": "ADDRESS",
        "canton": "GE",
        "postalCode": "1201",
        "city": "Genève",
        "street": "Rue du Rhône 1"
    });
    let (status, body) = post_json(
        &app,
        "/api/checkout",
        &checkout(&delivery, "2026-10-19", &small_cart()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("200"));
    assert!(fake.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unavailable_lookup_applies_minimum() {
    let (app, fake) = setup().await;

    let delivery = json!({
        "type": "ADDRESS",
        "canton": "VD",
        "postalCode": "1002",
        "city": "Lausanne",
        "street": "Place de la Gare 1"
    });
    let (status, _) = post_json(
        &app,
        "/api/checkout",
        &checkout(&delivery, "2026-10-17", &small_cart()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    // One attempt plus one retry.
    assert_eq!(fake.city_calls.load(Ordering::SeqCst), 2);
    assert!(fake.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_date_not_offered() {
    let (app, fake) = setup().await;

    // Stations are served on Mondays only.
    let delivery = json!({ "type": "RAILWAY_STATION", "stationId": "lausanne" });
    let (status, body) = post_json(
        &app,
        "/api/checkout",
        &checkout(&delivery, "2026-10-17", &small_cart()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["deliveryDate"].is_string());
    assert!(fake.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_total_overflow_rejected() {
    let (app, fake) = setup().await;

    let items = json!([
        { "productId": "raclette", "name": "Raclette", "quantity": 2, "unitPrice": "79228162514264337593543950335" }
    ]);
    let (status, body) = post_json(
        &app,
        "/api/checkout",
        &checkout(&json!({ "type": "PICKUP", "storeId": "nyon-shop" }), "2026-10-17", &items),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert_eq!(body["fields"]["items"], "Cart total is out of range");
    assert!(fake.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_field_errors_returned_together() {
    let (app, _) = setup().await;

    let (status, body) = post_json(
        &app,
        "/api/checkout",
        &json!({ "delivery": { "type": "PICKUP" }, "items": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid request");
    for field in [
        "customer.firstName",
        "customer.email",
        "customer.phone",
        "delivery.storeId",
        "deliveryDate",
        "paymentMethod",
        "items",
    ] {
        assert!(body["fields"][field].is_string(), "missing {field}");
    }
}

#[tokio::test]
async fn test_backend_failure_is_not_retried() {
    let (app, fake) = setup().await;

    let mut body = checkout(
        &json!({ "type": "PICKUP", "storeId": "nyon-shop" }),
        "2026-10-17",
        &small_cart(),
    );
    body["customer"]["lastName"] = json!("Reject");

    let (status, response) = post_json(&app, "/api/checkout", &body).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(response["error"], "External service error");
    assert!(fake.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_backend_rejects_valid_order() {
    let app = storefront(test_config(), wednesday());

    let (status, _) = post_json(
        &app,
        "/api/checkout",
        &checkout(
            &json!({ "type": "PICKUP", "storeId": "nyon-shop" }),
            "2026-10-18",
            &small_cart(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

// =============================================================================
// Proxied directories
// =============================================================================

#[tokio::test]
async fn test_remote_city_lookup() {
    let (app, _) = setup().await;

    let (status, body) = get_route(&app, "/api/delivery/cities/1260").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zoneId"], "la-cote");

    let (status, _) = get_route(&app, "/api/delivery/cities/8001").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_route(&app, "/api/delivery/cities/1002").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_station_directory_is_cached() {
    let (app, fake) = setup().await;

    for _ in 0..2 {
        let (status, body) = get_route(&app, "/api/delivery/railway-stations?lang=de").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], "lausanne");
        assert_eq!(body["data"][0]["platform"], "1");
    }
    assert_eq!(fake.station_calls.load(Ordering::SeqCst), 1);

    let (status, body) = get_route(&app, "/api/delivery/pickup-locations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "nyon-shop");

    let (_, ready) = get_route(&app, "/health/ready").await;
    assert_eq!(ready["cityDirectory"], "remote");
}
