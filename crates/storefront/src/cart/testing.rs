//! Test doubles for the cart module.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use secrecy::SecretString;

use jersey_shop_core::{
    AddCartItemRequest, CartItemId, CartLineItem, Customization, Jersey, JerseyId, JerseyType,
    JerseyTypeId, PatchSet, Price, TeamId, UserId,
};

use crate::models::{AuthSession, AuthStatus, SessionUser};
use crate::remote::{RemoteCart, RemoteCartError};

pub fn jersey(id: i32, price_cents: i64) -> Jersey {
    Jersey {
        id: JerseyId::new(id),
        team_id: TeamId::new(1),
        team_name: Some("Benfica".to_owned()),
        season: "2024/25".to_owned(),
        jersey_type_id: JerseyTypeId::new(1),
        jersey_type: Some(JerseyType {
            id: Some(JerseyTypeId::new(1)),
            name: "Home".to_owned(),
            original_price: Price::from_cents(price_cents),
            current_price: Price::from_cents(price_cents),
            description: None,
        }),
        main_color: "red".to_owned(),
        description: None,
        images: Vec::new(),
    }
}

pub fn signed_in() -> AuthStatus {
    AuthStatus::Authenticated(AuthSession::new(
        SessionUser {
            id: UserId::new(7),
            display_name: "Ana".to_owned(),
        },
        SecretString::from("test-token"),
    ))
}

/// In-memory cart API that merges adds the way the server does.
///
/// Clones share state, so a test can keep a handle after moving one into
/// the store.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<FakeState>,
}

#[derive(Default)]
struct FakeState {
    items: Mutex<Vec<CartLineItem>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeRemote {
    /// Make every following call fail with a 500.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Seed the server-side cart.
    pub fn seed(&self, mut line: CartLineItem) {
        line.remote_id = Some(self.next_id());
        self.state.items.lock().unwrap().push(line);
    }

    pub fn items(&self) -> Vec<CartLineItem> {
        self.state.items.lock().unwrap().clone()
    }

    fn next_id(&self) -> CartItemId {
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        CartItemId::new(i32::try_from(id).unwrap())
    }

    fn enter(&self) -> Result<(), RemoteCartError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(RemoteCartError::Api {
                status: 500,
                message: "Internal server error".to_owned(),
            });
        }
        Ok(())
    }
}

impl RemoteCart for FakeRemote {
    async fn fetch(&self, _token: &SecretString) -> Result<Vec<CartLineItem>, RemoteCartError> {
        self.enter()?;
        Ok(self.items())
    }

    async fn add(
        &self,
        _token: &SecretString,
        item: &AddCartItemRequest,
    ) -> Result<(), RemoteCartError> {
        self.enter()?;
        let customization = Customization::new(item.custom_name.clone(), item.custom_number.clone());
        let patches: PatchSet = item.patches.iter().cloned().collect();

        let mut items = self.state.items.lock().unwrap();
        if let Some(existing) = items.iter_mut().find(|line| {
            line.jersey.id == item.jersey_id
                && line.size == item.size
                && line.customization == customization
                && line.patches == patches
        }) {
            existing.increment();
            return Ok(());
        }

        let line = CartLineItem::from_parts(
            Some(self.next_id()),
            jersey(item.jersey_id.as_i32(), 2000),
            item.size,
            item.quantity,
            customization,
            patches,
            item.final_price,
        )
        .unwrap();
        items.push(line);
        Ok(())
    }

    async fn remove(&self, _token: &SecretString, id: CartItemId) -> Result<(), RemoteCartError> {
        self.enter()?;
        let mut items = self.state.items.lock().unwrap();
        let before = items.len();
        items.retain(|line| line.remote_id != Some(id));
        if items.len() == before {
            return Err(RemoteCartError::Api {
                status: 404,
                message: "Item not found".to_owned(),
            });
        }
        Ok(())
    }

    async fn clear(&self, _token: &SecretString) -> Result<(), RemoteCartError> {
        self.enter()?;
        self.state.items.lock().unwrap().clear();
        Ok(())
    }
}
