//! Integration tests for the catalog client.

use jersey_shop_core::{JerseyId, Price};
use jersey_shop_integration_tests::{FakeShopApi, jersey};
use jersey_shop_storefront::catalog::{CatalogClient, CatalogError, JerseyQuery};

#[tokio::test]
async fn test_get_jersey_is_cached() {
    let api = FakeShopApi::spawn(vec![jersey(1, "Sporting", 2499)]).await;
    let catalog = CatalogClient::new(&api.config()).expect("Failed to build client");

    let first = catalog.get_jersey(JerseyId::new(1)).await.expect("lookup failed");
    let second = catalog.get_jersey(JerseyId::new(1)).await.expect("lookup failed");

    assert_eq!(first, second);
    assert_eq!(first.base_price(), Price::from_cents(2499));
    assert_eq!(api.catalog_hits().await, 1);
}

#[tokio::test]
async fn test_missing_jersey_is_not_found() {
    let api = FakeShopApi::spawn(Vec::new()).await;
    let catalog = CatalogClient::new(&api.config()).expect("Failed to build client");

    let err = catalog
        .get_jersey(JerseyId::new(404))
        .await
        .expect_err("lookup should fail");
    assert!(matches!(err, CatalogError::NotFound(id) if id == JerseyId::new(404)));
}

#[tokio::test]
async fn test_list_filters_and_warms_cache() {
    let api = FakeShopApi::spawn(vec![
        jersey(1, "Sporting", 2000),
        jersey(2, "Porto", 2000),
        jersey(3, "Sporting Braga", 2000),
    ])
    .await;
    let catalog = CatalogClient::new(&api.config()).expect("Failed to build client");

    let page = catalog
        .list_jerseys(&JerseyQuery {
            search: Some("sporting".to_owned()),
            limit: Some(10),
            ..JerseyQuery::default()
        })
        .await
        .expect("listing failed");
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.data.len(), 2);

    // Both listed jerseys are now served from cache.
    catalog.get_jersey(JerseyId::new(3)).await.expect("lookup failed");
    assert_eq!(api.catalog_hits().await, 1);
}
