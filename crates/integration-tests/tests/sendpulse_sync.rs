//! Integration tests for `SendPulse` CRM sync.
//!
//! A fake `SendPulse` API records every call. Tokens are `tok-1`, `tok-2`, ...
//! in issue order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use lemanshop_core::{ContactId, Email, Language, Phone};
use lemanshop_integration_tests::{post_json, serve, storefront, test_config, wednesday};
use lemanshop_storefront::config::SendPulseConfig;
use lemanshop_storefront::services::{
    ContactSource, CrmContact, CrmSyncQueue, SendPulseClient, SendPulseError, SyncOutcome,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

#[derive(Default)]
struct FakeSendPulse {
    /// Reject `tok-1` on contact creation, as if it had been revoked.
    revoke_first_token: bool,
    tokens_issued: AtomicUsize,
    calls: Mutex<Vec<String>>,
    address_book_bodies: Mutex<Vec<Value>>,
}

impl FakeSendPulse {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn bearer(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    fn authorized(headers: &HeaderMap) -> bool {
        Self::bearer(headers).is_some_and(|token| token.starts_with("tok-"))
    }
}

async fn token(
    State(fake): State<Arc<FakeSendPulse>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if form.get("grant_type").map(String::as_str) != Some("client_credentials")
        || form.get("client_id").map(String::as_str) != Some("storefront")
    {
        return (StatusCode::UNAUTHORIZED, "invalid_client").into_response();
    }
    let n = fake.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({ "access_token": format!("tok-{n}"), "token_type": "Bearer", "expires_in": 3600 }))
        .into_response()
}

async fn create_contact(
    State(fake): State<Arc<FakeSendPulse>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.record("create".to_string());
    if !FakeSendPulse::authorized(&headers)
        || (fake.revoke_first_token && FakeSendPulse::bearer(&headers) == Some("tok-1"))
    {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if body["firstName"] == "Fallback" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "crm unavailable").into_response();
    }
    Json(json!({ "data": { "id": 101 } })).into_response()
}

async fn contact_detail(
    State(fake): State<Arc<FakeSendPulse>>,
    headers: HeaderMap,
    Path((id, detail)): Path<(String, String)>,
) -> StatusCode {
    fake.record(format!("{detail}:{id}"));
    if !FakeSendPulse::authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    match detail.as_str() {
        // Phone numbers are rejected to exercise partial failures.
        "phones" => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::OK,
    }
}

async fn address_books(State(fake): State<Arc<FakeSendPulse>>, headers: HeaderMap) -> Response {
    fake.record("addressbooks".to_string());
    if !FakeSendPulse::authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([ { "id": 55, "name": "Clients" }, { "id": 56, "name": "Newsletter" } ]))
        .into_response()
}

async fn add_emails(
    State(fake): State<Arc<FakeSendPulse>>,
    headers: HeaderMap,
    Path(book_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    fake.record(format!("addressbook:{book_id}"));
    if !FakeSendPulse::authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    fake.address_book_bodies.lock().unwrap().push(body);
    Json(json!({ "result": true })).into_response()
}

async fn start(fake: FakeSendPulse) -> (Arc<FakeSendPulse>, Url) {
    let fake = Arc::new(fake);
    let router = Router::new()
        .route("/oauth/access_token", post(token))
        .route("/crm/v1/contacts/create", post(create_contact))
        .route("/crm/v1/contacts/{id}/{detail}", post(contact_detail))
        .route("/addressbooks", get(address_books))
        .route("/addressbooks/{id}/emails", post(add_emails))
        .with_state(Arc::clone(&fake));
    let url = serve(router).await;
    (fake, url)
}

fn config(api_url: Url, client_id: &str, addressbook_id: Option<i64>) -> SendPulseConfig {
    SendPulseConfig {
        api_url,
        client_id: client_id.to_string(),
        client_secret: SecretString::from("sp-9f8e7d6c5b4a3f2e1d0c-test"),
        addressbook_id,
    }
}

fn contact(first_name: &str) -> CrmContact {
    CrmContact {
        email: Email::parse("anna@example.ch").unwrap(),
        first_name: Some(first_name.to_string()),
        last_name: Some("Muller".to_string()),
        phone: Some(Phone::parse("079 123 45 67").unwrap()),
        language: Language::Fr,
        source: ContactSource::Checkout,
    }
}

// =============================================================================
// Client
// =============================================================================

#[tokio::test]
async fn test_sync_continues_after_substep_failure() {
    let (fake, url) = start(FakeSendPulse::default()).await;
    let client = SendPulseClient::new(&config(url, "storefront", None)).unwrap();

    let outcome = client.sync_contact(&contact("Anna")).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Contact(ContactId::new("101")));
    assert_eq!(
        fake.calls(),
        ["create", "emails:101", "phones:101", "attributes:101"]
    );
}

#[tokio::test]
async fn test_token_is_reused() {
    let (fake, url) = start(FakeSendPulse::default()).await;
    let client = SendPulseClient::new(&config(url, "storefront", None)).unwrap();

    client.sync_contact(&contact("Anna")).await.unwrap();
    client.sync_contact(&contact("Anna")).await.unwrap();

    assert_eq!(fake.tokens_issued.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fallback_to_first_address_book() {
    let (fake, url) = start(FakeSendPulse::default()).await;
    let client = SendPulseClient::new(&config(url, "storefront", None)).unwrap();

    let outcome = client.sync_contact(&contact("Fallback")).await.unwrap();

    assert_eq!(outcome, SyncOutcome::AddressBook(55));
    assert_eq!(fake.calls(), ["create", "addressbooks", "addressbook:55"]);

    let bodies = fake.address_book_bodies.lock().unwrap();
    let email = &bodies[0]["emails"][0];
    assert_eq!(email["email"], "anna@example.ch");
    assert_eq!(email["variables"]["name"], "Fallback Muller");
    assert_eq!(email["variables"]["phone"], "+41791234567");
    assert_eq!(email["variables"]["language"], "fr");
}

#[tokio::test]
async fn test_fallback_to_configured_address_book() {
    let (fake, url) = start(FakeSendPulse::default()).await;
    let client = SendPulseClient::new(&config(url, "storefront", Some(77))).unwrap();

    let outcome = client.sync_contact(&contact("Fallback")).await.unwrap();

    assert_eq!(outcome, SyncOutcome::AddressBook(77));
    assert_eq!(fake.calls(), ["create", "addressbook:77"]);
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let fake = FakeSendPulse {
        revoke_first_token: true,
        ..FakeSendPulse::default()
    };
    let (fake, url) = start(fake).await;
    let client = SendPulseClient::new(&config(url, "storefront", None)).unwrap();

    // Creation is refused with the revoked token; the fallback authenticates again.
    let outcome = client.sync_contact(&contact("Anna")).await.unwrap();

    assert_eq!(outcome, SyncOutcome::AddressBook(55));
    assert_eq!(fake.tokens_issued.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_bad_credentials() {
    let (fake, url) = start(FakeSendPulse::default()).await;
    let client = SendPulseClient::new(&config(url, "someone-else", None)).unwrap();

    let err = client.sync_contact(&contact("Anna")).await.unwrap_err();

    assert!(matches!(err, SendPulseError::AuthenticationFailed(_)), "{err}");
    assert!(fake.calls().is_empty());
}

// =============================================================================
// Queue
// =============================================================================

#[tokio::test]
async fn test_queue_worker_with_client() {
    let (fake, url) = start(FakeSendPulse::default()).await;
    let client = SendPulseClient::new(&config(url, "storefront", None)).unwrap();

    let (queue, worker) = CrmSyncQueue::new(8, client);
    assert!(queue.enqueue(contact("Anna")));
    assert!(queue.enqueue(contact("Fallback")));
    drop(queue);

    let stats = worker.run().await;
    assert_eq!(stats.synced, 1);
    assert_eq!(stats.fallback, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(fake.tokens_issued.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_crm_route_queues_contact() {
    let (fake, url) = start(FakeSendPulse::default()).await;
    let mut config_with_crm = test_config();
    config_with_crm.sendpulse = Some(config(url, "storefront", None));
    let app = storefront(config_with_crm, wednesday());

    let (status, body) = post_json(
        &app,
        "/api/crm/contacts",
        &json!({ "email": "lea@example.ch", "firstName": "Léa", "source": "newsletter" }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["queued"], true);

    // The worker runs in the background.
    let mut synced = false;
    for _ in 0..100 {
        if fake.calls().iter().any(|call| call == "attributes:101") {
            synced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(synced, "contact was not synced: {:?}", fake.calls());

    let (_, ready) = lemanshop_integration_tests::get(&app, "/health/ready").await;
    assert_eq!(ready["crm"]["enqueued"], 1);
}
