//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! js-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CART_API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/cart-api/migrations/` and are embedded at
//! compile time:
//! ```text
//! migrations/
//! ├── 20260301000001_create_catalog.sql
//! └── 20260301000002_create_cart.sql
//! ```

use jersey_shop_cart_api::db;

use super::{CommandError, database_url};

/// Run cart API database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to cart API database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running cart API migrations...");
    sqlx::migrate!("../cart-api/migrations").run(&pool).await?;

    tracing::info!("Cart API migrations complete!");
    Ok(())
}
