//! In-process mock of the Shutterbay commerce API.
//!
//! Serves the same JSON shapes as the real API on an ephemeral port so the
//! client crate can be exercised over real HTTP: credential refresh,
//! cart reconciliation, catalog caching, and order fulfillment. Tests
//! control credential validity through [`MockApi`] and read hit counters
//! to assert how many requests actually reached the server.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

/// Credentials the mock hands out at login.
pub const INITIAL_ACCESS: &str = "access-1";
/// The refresh token the mock accepts.
pub const REFRESH_TOKEN: &str = "refresh-1";

/// Handle onto a running mock API server.
pub struct MockApi {
    base_url: String,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    /// The access token protected endpoints currently accept.
    accepted_access: Mutex<String>,
    /// The access token the next successful refresh hands out.
    issued_access: Mutex<String>,
    refresh_ok: AtomicBool,
    refresh_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    products_calls: AtomicUsize,
    search_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockApi {
    /// Bind an ephemeral port and serve the mock API on it.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState {
            accepted_access: Mutex::new(INITIAL_ACCESS.to_owned()),
            issued_access: Mutex::new(INITIAL_ACCESS.to_owned()),
            refresh_ok: AtomicBool::new(true),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/refresh", post(refresh))
            .route("/auth/logout", post(logout))
            .route("/users/profile", get(profile))
            .route("/products", get(products))
            .route("/products/search", get(search))
            .route("/cart", get(cart_get).post(cart_add).delete(cart_clear))
            .route("/cart/{id}", put(cart_update).delete(cart_remove))
            .route("/admin/orders", get(admin_orders))
            .route("/admin/orders/{id}/status", put(order_status))
            .route("/admin/products", post(create_product))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API port");
        let addr = listener.local_addr().expect("Mock API has no local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock API exited");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL for pointing an `ApiClient` at this server.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Invalidate the current access token. Refresh hands out `new_access`
    /// and protected endpoints accept only it from now on.
    pub fn expire_access(&self, new_access: &str) {
        *self.state.accepted_access.lock().expect("lock") = new_access.to_owned();
        *self.state.issued_access.lock().expect("lock") = new_access.to_owned();
    }

    /// Make refresh succeed but hand out a token protected endpoints
    /// still reject.
    pub fn poison_refresh(&self) {
        *self.state.issued_access.lock().expect("lock") = "bogus-access".to_owned();
    }

    /// Make refresh fail with 401.
    pub fn break_refresh(&self) {
        self.state.refresh_ok.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn profile_calls(&self) -> usize {
        self.state.profile_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn products_calls(&self) -> usize {
        self.state.products_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn search_calls(&self) -> usize {
        self.state.search_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status_calls(&self) -> usize {
        self.state.status_calls.load(Ordering::SeqCst)
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": message }))).into_response()
}

/// Check the bearer token against the currently accepted access token.
fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let accepted = state.accepted_access.lock().expect("lock").clone();
    match bearer {
        Some(token) if token == accepted => Ok(()),
        Some(_) => Err(unauthorized("jwt expired")),
        None => Err(unauthorized("no token provided")),
    }
}

fn sample_user() -> Value {
    json!({
        "id": "u1",
        "name": "Ada Operator",
        "email": "ada@example.com",
        "role": "admin",
    })
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if body.get("email").and_then(Value::as_str).is_none() {
        return unauthorized("Invalid credentials");
    }

    let access = state.accepted_access.lock().expect("lock").clone();
    Json(json!({
        "token": access,
        "refreshToken": REFRESH_TOKEN,
        "user": sample_user(),
    }))
    .into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if !state.refresh_ok.load(Ordering::SeqCst) {
        return unauthorized("refresh token expired");
    }
    if body.get("refreshToken").and_then(Value::as_str) != Some(REFRESH_TOKEN) {
        return unauthorized("unknown refresh token");
    }

    let issued = state.issued_access.lock().expect("lock").clone();
    Json(json!({ "token": issued })).into_response()
}

async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out" }))
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.profile_calls.fetch_add(1, Ordering::SeqCst);
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({ "user": sample_user() })).into_response()
}

fn sample_product(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "brand": "Canon",
        "category": "Cameras",
        "price": "2499.99",
        "stock": 5,
        "description": "Full-frame mirrorless",
        "image": "https://img.example/r6.jpg",
        "images": [],
        "topSeller": true,
        "specifications": { "Sensor": "Full-frame" },
    })
}

async fn products(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.products_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!([sample_product("p1", "EOS R6"), sample_product("p2", "EOS R8")]))
}

async fn search(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.search_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "products": [sample_product("p1", "EOS R6")] }))
}

fn cart_item(id: &str, name: &str, quantity: u32) -> Value {
    json!({
        "productId": id,
        "name": name,
        "price": "100",
        "image": "",
        "quantity": quantity,
    })
}

async fn cart_get(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({ "items": [cart_item("p1", "EOS R6", 1)] })).into_response()
}

/// The server's answer to an add always includes a line the client never
/// sent, so reconciliation tests can prove the local cart was replaced
/// wholesale rather than merged.
async fn cart_add(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    let id = body
        .pointer("/product/id")
        .and_then(Value::as_str)
        .unwrap_or("p1")
        .to_owned();
    let qty = body.get("qty").and_then(Value::as_u64).unwrap_or(1);

    Json(json!({
        "items": [
            cart_item(&id, "EOS R6", u32::try_from(qty).unwrap_or(1)),
            cart_item("srv-extra", "Server-side addition", 2),
        ]
    }))
    .into_response()
}

async fn cart_update(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let qty = body.get("qty").and_then(Value::as_u64).unwrap_or(1);
    Json(json!({ "items": [cart_item(&id, "EOS R6", u32::try_from(qty).unwrap_or(1))] }))
        .into_response()
}

async fn cart_remove(
    State(state): State<Arc<MockState>>,
    Path(_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({ "items": [] })).into_response()
}

async fn cart_clear(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({ "message": "Cart cleared" })).into_response()
}

async fn admin_orders(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    Json(json!({
        "orders": [
            {
                "id": "ord-1",
                "items": [ { "name": "EOS R6", "price": "2499.99", "quantity": 1 } ],
                "total": "2499.99",
                "status": "Pending",
                "createdAt": "2026-08-01T12:00:00Z",
                "user": { "name": "Ada", "email": "ada@example.com" },
            },
            {
                "id": "ord-2",
                "items": [],
                "total": "149.00",
                "status": "Delivered",
                "createdAt": "2026-07-20T09:30:00Z",
            },
        ]
    }))
    .into_response()
}

async fn order_status(
    State(state): State<Arc<MockState>>,
    Path(_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.status_calls.fetch_add(1, Ordering::SeqCst);

    if body.get("status").and_then(Value::as_str).is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "status is required" })),
        )
            .into_response();
    }

    Json(json!({ "message": "Order status updated" })).into_response()
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Unnamed")
        .to_owned();
    Json(json!({ "product": sample_product("p-new", &name) })).into_response()
}
