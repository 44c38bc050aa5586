//! Database operations for the cart API.
//!
//! ## Tables
//!
//! - `catalog.league`, `catalog.team` - Catalog grouping
//! - `catalog.jersey_type` - Jersey types and their prices
//! - `catalog.jersey`, `catalog.jersey_image` - Jerseys and embedded images
//! - `cart.api_token` - SHA-256 of issued bearer tokens
//! - `cart.cart_item` - Per-user cart lines
//!
//! # Migrations
//!
//! Migrations are stored in `crates/cart-api/migrations/` and run via:
//! ```bash
//! cargo run -p jersey-shop-cli -- migrate
//! ```

pub mod cart;
pub mod catalog;
pub mod tokens;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use catalog::{CatalogRepository, JerseyFilter};
pub use tokens::{ApiTokenRepository, TokenOwner};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
