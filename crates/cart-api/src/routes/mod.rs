//! HTTP route handlers for the cart API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Liveness check
//! GET    /health/ready               - Readiness check (database)
//!
//! # Catalog (public)
//! GET    /api/catalog/jerseys        - Paginated listing with filters
//! GET    /api/catalog/jerseys/{id}   - Single jersey
//!
//! # Cart (bearer token)
//! GET    /api/cart                   - All lines of the caller's cart
//! POST   /api/cart                   - Add or merge a line
//! DELETE /api/cart                   - Clear the cart
//! DELETE /api/cart/{id}              - Remove one line
//! ```

pub mod cart;
pub mod catalog;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/jerseys", get(catalog::list_jerseys))
        .route("/jerseys/{id}", get(catalog::get_jersey))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route("/{id}", delete(cart::remove))
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog_routes())
        .nest("/cart", cart_routes())
}
