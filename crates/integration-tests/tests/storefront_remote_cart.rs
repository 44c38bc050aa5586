//! Integration tests for the signed-in cart over HTTP.
//!
//! Runs the cart engine against an in-process fake of the shop API.

use std::time::Duration;

use secrecy::SecretString;

use jersey_shop_core::{
    AddCartItemRequest, CartItemId, CartLineItem, Customization, JerseyId, PatchSet, Price, Size,
    UserId,
};
use jersey_shop_integration_tests::{FakeShopApi, VALID_TOKEN, jersey};
use jersey_shop_storefront::cart::{CartEngine, CartPersistence, MutationOutcome};
use jersey_shop_storefront::models::{AuthSession, AuthStatus, SessionUser};
use jersey_shop_storefront::remote::{RemoteCart, RemoteCartClient, RemoteCartError};
use jersey_shop_storefront::storage::MemoryStorage;

fn session(token: &str) -> AuthSession {
    AuthSession::new(
        SessionUser {
            id: UserId::new(1),
            display_name: "Ana".to_owned(),
        },
        SecretString::from(token),
    )
}

fn engine(api: &FakeShopApi, status: AuthStatus) -> CartEngine<MemoryStorage, RemoteCartClient> {
    let remote = RemoteCartClient::new(&api.config()).expect("Failed to build client");
    CartEngine::new(CartPersistence::new(MemoryStorage::new(), remote), status)
}

// =============================================================================
// RemoteCartClient
// =============================================================================

#[tokio::test]
async fn test_add_then_fetch() {
    let api = FakeShopApi::spawn(vec![jersey(1, "Sporting", 2000)]).await;
    let client = RemoteCartClient::new(&api.config()).expect("Failed to build client");
    let token = SecretString::from(VALID_TOKEN);

    let line = CartLineItem::new(
        jersey(1, "Sporting", 2000),
        Size::L,
        Customization::new(Some("JARDEL".to_owned()), Some("4".to_owned())),
        ["Liga"].into_iter().collect(),
    );
    let request = AddCartItemRequest::from(&line);
    client.add(&token, &request).await.expect("add failed");
    client.add(&token, &request).await.expect("add failed");

    let items = client.fetch(&token).await.expect("fetch failed");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity(), 2);
    assert_eq!(items[0].final_unit_price, Price::from_cents(2500));
    assert_eq!(items[0].customization.name.as_deref(), Some("JARDEL"));
    assert!(items[0].remote_id.is_some());
}

#[tokio::test]
async fn test_bad_token_is_unauthorized() {
    let api = FakeShopApi::spawn(Vec::new()).await;
    let client = RemoteCartClient::new(&api.config()).expect("Failed to build client");

    let err = client
        .fetch(&SecretString::from("expired"))
        .await
        .expect_err("fetch should fail");
    assert!(matches!(err, RemoteCartError::Unauthorized));
}

#[tokio::test]
async fn test_remove_unknown_item_is_api_error() {
    let api = FakeShopApi::spawn(Vec::new()).await;
    let client = RemoteCartClient::new(&api.config()).expect("Failed to build client");

    let err = client
        .remove(&SecretString::from(VALID_TOKEN), CartItemId::new(99))
        .await
        .expect_err("remove should fail");
    assert!(matches!(err, RemoteCartError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_api_is_http_error() {
    let api = FakeShopApi::spawn(Vec::new()).await;
    let config = api.config();
    drop(api);

    let client = RemoteCartClient::new(&config).expect("Failed to build client");
    // Give the aborted server a moment to release the port.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let err = client
        .fetch(&SecretString::from(VALID_TOKEN))
        .await
        .expect_err("fetch should fail");
    assert!(matches!(err, RemoteCartError::Http(_)));
}

// =============================================================================
// CartEngine
// =============================================================================

#[tokio::test]
async fn test_signed_in_cart_follows_server() {
    let api = FakeShopApi::spawn(vec![jersey(1, "Sporting", 2000), jersey(2, "Porto", 3000)]).await;
    let engine = engine(&api, AuthStatus::Authenticated(session(VALID_TOKEN)));
    engine.load_current().await;

    let mut store = engine.lock().await;
    for _ in 0..3 {
        let outcome = store
            .add_item(jersey(1, "Sporting", 2000), Size::M, Customization::none(), PatchSet::new())
            .await;
        assert_eq!(outcome, MutationOutcome::Applied);
    }
    store
        .add_item(jersey(2, "Porto", 3000), Size::S, Customization::none(), PatchSet::new())
        .await;

    assert_eq!(store.items().len(), 2);
    assert_eq!(store.total_items(), 4);
    let totals = store.totals();
    // 3×20 + 30 = 90, 4 units at the 3€ tier
    assert_eq!(totals.subtotal, Price::from_cents(9000));
    assert_eq!(totals.total_discount, Price::from_cents(1200));
    assert_eq!(totals.final_total, Price::from_cents(7800));

    let outcome = store
        .remove_item(JerseyId::new(2), Size::S, Customization::none(), PatchSet::new())
        .await;
    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(api.cart().await.len(), 1);

    assert_eq!(store.clear().await, MutationOutcome::Applied);
    assert!(store.items().is_empty());
    assert!(api.cart().await.is_empty());
}

#[tokio::test]
async fn test_rejected_token_keeps_cart() {
    let api = FakeShopApi::spawn(vec![jersey(1, "Sporting", 2000)]).await;
    let engine = engine(&api, AuthStatus::Authenticated(session("revoked")));
    engine.load_current().await;

    let mut store = engine.lock().await;
    assert!(store.items().is_empty());
    let outcome = store
        .add_item(jersey(1, "Sporting", 2000), Size::M, Customization::none(), PatchSet::new())
        .await;
    assert_eq!(outcome, MutationOutcome::Failed);
    assert!(store.items().is_empty());
    assert!(store.is_drawer_open());
}

#[tokio::test]
async fn test_sign_in_switches_to_server_cart() {
    let api = FakeShopApi::spawn(vec![jersey(1, "Sporting", 2000), jersey(2, "Porto", 3000)]).await;
    let engine = engine(&api, AuthStatus::Guest);
    engine.load_current().await;

    engine
        .lock()
        .await
        .add_item(jersey(2, "Porto", 3000), Size::XL, Customization::none(), PatchSet::new())
        .await;

    let sync = engine.spawn_sync();
    engine.signal().sign_in(session(VALID_TOKEN));

    let mut signed_in = false;
    for _ in 0..200 {
        {
            let store = engine.lock().await;
            if store.status().is_authenticated() && !store.is_loading() {
                // The guest line was dropped, not uploaded.
                assert!(store.items().is_empty());
                signed_in = true;
            }
        }
        if signed_in {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(signed_in, "cart sync did not pick up the sign-in");
    assert!(api.cart().await.is_empty());
    sync.abort();
}
