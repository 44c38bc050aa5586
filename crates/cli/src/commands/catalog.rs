//! Catalog browsing against the cart API.
//!
//! # Environment Variables
//!
//! - `JERSEY_SHOP_API_URL` - API base URL (e.g. `http://127.0.0.1:8000/api`)

use jersey_shop_core::JerseyId;
use jersey_shop_storefront::StorefrontConfig;
use jersey_shop_storefront::catalog::{CatalogClient, JerseyQuery};

use super::print_json;

/// Print one jersey as JSON.
///
/// # Errors
///
/// Returns an error if configuration is missing or the jersey cannot be read.
pub async fn show(id: i32) -> Result<(), Box<dyn std::error::Error>> {
    let client = CatalogClient::new(&StorefrontConfig::from_env()?)?;
    let jersey = client.get_jersey(JerseyId::new(id)).await?;
    print_json(&jersey)
}

/// Print a page of jerseys as JSON.
///
/// # Errors
///
/// Returns an error if configuration is missing or the listing fails.
pub async fn list(query: JerseyQuery) -> Result<(), Box<dyn std::error::Error>> {
    let client = CatalogClient::new(&StorefrontConfig::from_env()?)?;
    let page = client.list_jerseys(&query).await?;
    tracing::info!(
        total = page.total,
        page = page.page,
        total_pages = page.total_pages,
        "Catalog page"
    );
    print_json(&page.data)
}
