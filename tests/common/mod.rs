// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use eurofood_market::config::Config;
use eurofood_market::db::{FirestoreDb, MemoryStore};
use eurofood_market::middleware::auth::create_session_token;
use eurofood_market::middleware::SessionContext;
use eurofood_market::models::{Address, NewProduct, Product, Role};
use eurofood_market::routes::create_router;
use eurofood_market::services::{NotificationService, StorageService};
use eurofood_market::AppState;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Shared state over `db` with a recording notifier and in-memory blobs.
#[allow(dead_code)]
pub fn test_state(db: FirestoreDb) -> Arc<AppState> {
    Arc::new(AppState::new(
        Config::test_default(),
        db,
        NotificationService::new_recording(),
        StorageService::new_mock(),
    ))
}

/// Create a test app over a fresh in-memory store.
/// Returns the router, the shared state and the store (for fault injection).
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = test_state(FirestoreDb::with_memory_store(store.clone()));
    (create_router(state.clone()), state, store)
}

/// Create a test app whose store is unreachable.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state(test_db_offline());
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn buyer(uid: &str) -> SessionContext {
    SessionContext {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
        display_name: format!("Buyer {}", uid),
        role: Role::Buyer,
    }
}

#[allow(dead_code)]
pub fn seller(uid: &str) -> SessionContext {
    SessionContext {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
        display_name: format!("Seller {}", uid),
        role: Role::Seller,
    }
}

/// Register `ctx` as a seller in the store.
#[allow(dead_code)]
pub async fn register_seller(state: &AppState, ctx: &SessionContext) {
    state.users.set_role(ctx, Role::Seller).await.unwrap();
}

/// Session token for `uid` signed with the test key.
#[allow(dead_code)]
pub fn token_for(state: &AppState, uid: &str) -> String {
    create_session_token(
        uid,
        &format!("{}@example.com", uid),
        uid,
        &state.config.jwt_signing_key,
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn new_product(name: &str, cents: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: "A test product".to_string(),
        story: String::new(),
        price: Decimal::new(cents, 2),
        category: "cheese".to_string(),
        country: "Italy".to_string(),
        country_id: "italy".to_string(),
        region: "Emilia-Romagna".to_string(),
        stock: 25,
        shelf_life: "6 months".to_string(),
        pair_with: vec![],
        tags: vec![],
        image_url: None,
        active: true,
        featured: false,
    }
}

/// Product creation body as a client would send it.
#[allow(dead_code)]
pub fn product_json(name: &str, price: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": "Made by hand in small batches",
        "price": price,
        "category": "cheese",
        "country": "Italy",
        "countryId": "italy",
        "stock": 12
    })
}

/// Add an active product owned by `seller`.
#[allow(dead_code)]
pub async fn add_product(
    state: &AppState,
    seller: &SessionContext,
    name: &str,
    cents: i64,
) -> Product {
    state
        .catalog
        .add_product(seller, new_product(name, cents))
        .await
        .unwrap()
}

#[allow(dead_code)]
pub fn test_address() -> Address {
    Address {
        full_name: "Anna Schmidt".to_string(),
        street: "Hauptstraße 12".to_string(),
        city: "Berlin".to_string(),
        postal_code: "10115".to_string(),
        country: "Germany".to_string(),
        phone: None,
    }
}

/// Wait for the background notification task to deliver `count` messages.
#[allow(dead_code)]
pub async fn wait_for_notifications(notifier: &NotificationService, count: usize) {
    for _ in 0..100 {
        if notifier.sent().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {} notifications, got {}",
        count,
        notifier.sent().len()
    );
}

/// Build a request with a bearer token and optional JSON body.
#[allow(dead_code)]
pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[allow(dead_code)]
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
