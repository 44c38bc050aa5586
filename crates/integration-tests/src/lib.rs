//! Integration test support for Jersey Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no external services)
//! cargo test -p jersey-shop-integration-tests
//!
//! # Live cart API tests
//! CART_API_BASE_URL=http://localhost:8000/api CART_API_TEST_TOKEN=... \
//!     cargo test -p jersey-shop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_*` - cart engine and catalog client against [`FakeShopApi`]
//! - `cart_api` - HTTP tests against a running cart API (ignored by default)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use jersey_shop_core::{
    AddCartItemRequest, CartItemId, CartItemResponse, Jersey, JerseyId, JerseyType, JerseyTypeId,
    Page, Price, TeamId,
};
use jersey_shop_storefront::StorefrontConfig;

/// The only bearer token [`FakeShopApi`] accepts.
pub const VALID_TOKEN: &str = "valid-token";

/// A catalog jersey priced at `price_cents`.
#[must_use]
pub fn jersey(id: i32, team: &str, price_cents: i64) -> Jersey {
    Jersey {
        id: JerseyId::new(id),
        team_id: TeamId::new(id),
        team_name: Some(team.to_owned()),
        season: "2024/25".to_owned(),
        jersey_type_id: JerseyTypeId::new(1),
        jersey_type: Some(JerseyType {
            id: Some(JerseyTypeId::new(1)),
            name: "Home".to_owned(),
            original_price: Price::from_cents(price_cents),
            current_price: Price::from_cents(price_cents),
            description: None,
        }),
        main_color: "green".to_owned(),
        description: None,
        images: Vec::new(),
    }
}

#[derive(Default)]
struct ShopData {
    jerseys: Vec<Jersey>,
    cart: Vec<CartItemResponse>,
    next_id: i32,
    catalog_hits: usize,
}

type SharedData = Arc<Mutex<ShopData>>;

/// In-process stand-in for the shop API (catalog plus one user's cart),
/// served under `/api` on an ephemeral port.
pub struct FakeShopApi {
    addr: SocketAddr,
    data: SharedData,
    handle: JoinHandle<()>,
}

impl FakeShopApi {
    /// Start serving `jerseys` with an empty cart.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn(jerseys: Vec<Jersey>) -> Self {
        let data: SharedData = Arc::new(Mutex::new(ShopData {
            jerseys,
            ..ShopData::default()
        }));

        let api = Router::new()
            .route("/catalog/jerseys", get(list_jerseys))
            .route("/catalog/jerseys/{id}", get(get_jersey))
            .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
            .route("/cart/{id}", delete(remove_from_cart))
            .with_state(Arc::clone(&data));
        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake shop API");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, data, handle }
    }

    /// Base URL of the API, e.g. `http://127.0.0.1:41234/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Storefront configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Never in practice; the base URL is always valid.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::for_api_url(&self.base_url()).expect("Fake API URL is valid")
    }

    /// Server-side cart contents.
    pub async fn cart(&self) -> Vec<CartItemResponse> {
        self.data.lock().await.cart.clone()
    }

    /// Number of catalog requests served.
    pub async fn catalog_hits(&self) -> usize {
        self.data.lock().await.catalog_hits
    }
}

impl Drop for FakeShopApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Could not validate credentials" })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        == Some(VALID_TOKEN)
}

#[derive(Deserialize)]
struct ListParams {
    search: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_jerseys(
    State(data): State<SharedData>,
    Query(params): Query<ListParams>,
) -> Json<Page<Jersey>> {
    let mut data = data.lock().await;
    data.catalog_hits += 1;

    let search = params.search.unwrap_or_default().to_lowercase();
    let matching: Vec<Jersey> = data
        .jerseys
        .iter()
        .filter(|j| {
            search.is_empty()
                || j.team_name
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&search))
        })
        .cloned()
        .collect();

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).max(1);
    let total = matching.len() as u64;
    let start = ((page - 1) * limit) as usize;
    Json(Page {
        data: matching
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect(),
        total,
        page,
        total_pages: u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX),
    })
}

async fn get_jersey(State(data): State<SharedData>, Path(id): Path<i32>) -> Response {
    let mut data = data.lock().await;
    data.catalog_hits += 1;
    match data.jerseys.iter().find(|j| j.id == JerseyId::new(id)) {
        Some(jersey) => Json(jersey.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Jersey not found" })),
        )
            .into_response(),
    }
}

async fn get_cart(State(data): State<SharedData>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(data.lock().await.cart.clone()).into_response()
}

async fn add_to_cart(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Json(request): Json<AddCartItemRequest>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut data = data.lock().await;
    let mut patches = request.patches.clone();
    patches.sort();

    if let Some(existing) = data.cart.iter_mut().find(|item| {
        let mut existing_patches = item.patches.clone();
        existing_patches.sort();
        item.jersey_id == request.jersey_id
            && item.size == request.size
            && item.custom_name == request.custom_name
            && item.custom_number == request.custom_number
            && existing_patches == patches
    }) {
        existing.quantity += request.quantity;
        return (StatusCode::CREATED, Json(existing.clone())).into_response();
    }

    data.next_id += 1;
    let item = CartItemResponse {
        id: CartItemId::new(data.next_id),
        jersey_id: request.jersey_id,
        jersey: data
            .jerseys
            .iter()
            .find(|j| j.id == request.jersey_id)
            .cloned(),
        size: request.size,
        quantity: request.quantity,
        custom_name: request.custom_name,
        custom_number: request.custom_number,
        patches,
        final_price: request.final_price,
    };
    data.cart.push(item.clone());
    (StatusCode::CREATED, Json(item)).into_response()
}

async fn remove_from_cart(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut data = data.lock().await;
    let before = data.cart.len();
    data.cart.retain(|item| item.id != CartItemId::new(id));
    if data.cart.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Item not found" })),
        )
            .into_response();
    }
    Json(json!({ "message": "Item removed from cart" })).into_response()
}

async fn clear_cart(State(data): State<SharedData>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    data.lock().await.cart.clear();
    Json(json!({ "message": "Cart cleared" })).into_response()
}
