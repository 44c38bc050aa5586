//! Where the cart lives: device storage for guests, the cart API for
//! signed-in customers.
//!
//! [`CartPersistence`] picks the strategy from the current [`AuthStatus`].
//! Guest writes update the list locally and then persist it. Remote writes
//! call the API and then re-fetch, so the server stays the source of truth
//! for line ids, merged quantities and prices.

use tracing::{debug, instrument, warn};

use jersey_shop_core::{AddCartItemRequest, CartLineItem, LineKey};

use super::store::{merge_line, remove_line};
use crate::error::Result;
use crate::models::AuthStatus;
use crate::remote::RemoteCart;
use crate::storage::LocalStorage;

/// Storage key for the guest cart.
pub const GUEST_CART_KEY: &str = "cart_guest";

/// The guest cart as a JSON array under [`GUEST_CART_KEY`].
#[derive(Debug)]
pub struct GuestCart<S> {
    storage: S,
}

impl<S: LocalStorage> GuestCart<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read the saved guest cart.
    ///
    /// Missing, unreadable or corrupt data yields an empty cart; the problem
    /// is logged and never surfaced.
    pub fn load(&self) -> Vec<CartLineItem> {
        let raw = match self.storage.get_item(GUEST_CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read guest cart");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Discarding corrupt guest cart");
                Vec::new()
            }
        }
    }

    /// Overwrite the saved guest cart with `items`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the write fails (quota, I/O).
    pub fn save(&mut self, items: &[CartLineItem]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.storage.set_item(GUEST_CART_KEY, &raw)?;
        Ok(())
    }

    /// The underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Save, logging instead of failing. The in-memory cart stays valid
    /// when device storage is full.
    fn save_or_warn(&mut self, items: &[CartLineItem]) {
        if let Err(e) = self.save(items) {
            warn!(error = %e, "Failed to persist guest cart");
        }
    }
}

/// Strategy selector over the two cart backends.
#[derive(Debug)]
pub struct CartPersistence<S, R> {
    guest: GuestCart<S>,
    remote: R,
}

impl<S: LocalStorage, R: RemoteCart> CartPersistence<S, R> {
    pub const fn new(storage: S, remote: R) -> Self {
        Self {
            guest: GuestCart::new(storage),
            remote,
        }
    }

    /// The guest strategy.
    pub const fn guest(&self) -> &GuestCart<S> {
        &self.guest
    }

    /// The remote strategy.
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Load the cart for `status`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if the cart API cannot be read. Guest
    /// loads never fail.
    #[instrument(skip_all, fields(authenticated = status.is_authenticated()))]
    pub async fn load(&self, status: &AuthStatus) -> Result<Vec<CartLineItem>> {
        match status {
            AuthStatus::Guest => Ok(self.guest.load()),
            AuthStatus::Authenticated(session) => {
                Ok(self.remote.fetch(&session.token).await?)
            }
        }
    }

    /// Add one unit of `line` and return the new cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if the cart API rejects the add or the
    /// re-fetch fails. Guest adds never fail.
    #[instrument(skip_all, fields(jersey_id = %line.jersey.id, size = %line.size))]
    pub async fn add(
        &mut self,
        status: &AuthStatus,
        current: &[CartLineItem],
        line: CartLineItem,
    ) -> Result<Vec<CartLineItem>> {
        match status {
            AuthStatus::Guest => {
                let mut items = current.to_vec();
                merge_line(&mut items, line);
                self.guest.save_or_warn(&items);
                Ok(items)
            }
            AuthStatus::Authenticated(session) => {
                let request = AddCartItemRequest::from(&line);
                self.remote.add(&session.token, &request).await?;
                Ok(self.remote.fetch(&session.token).await?)
            }
        }
    }

    /// Remove the line identified by `key` and return the new cart.
    ///
    /// Returns `Ok(None)` when there is nothing to remove: no line has that
    /// identity, or a signed-in line has no server id yet.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if the cart API rejects the delete or the
    /// re-fetch fails.
    #[instrument(skip_all, fields(jersey_id = %key.jersey_id, size = %key.size))]
    pub async fn remove(
        &mut self,
        status: &AuthStatus,
        current: &[CartLineItem],
        key: &LineKey,
    ) -> Result<Option<Vec<CartLineItem>>> {
        match status {
            AuthStatus::Guest => {
                let mut items = current.to_vec();
                if !remove_line(&mut items, key) {
                    debug!("No matching guest line");
                    return Ok(None);
                }
                self.guest.save_or_warn(&items);
                Ok(Some(items))
            }
            AuthStatus::Authenticated(session) => {
                let Some(remote_id) = current
                    .iter()
                    .find(|item| item.matches(key))
                    .and_then(|item| item.remote_id)
                else {
                    debug!("No matching remote line");
                    return Ok(None);
                };
                self.remote.remove(&session.token, remote_id).await?;
                Ok(Some(self.remote.fetch(&session.token).await?))
            }
        }
    }

    /// Empty the cart and return what is left (normally nothing).
    ///
    /// # Errors
    ///
    /// Returns `CartError::Remote` if the cart API rejects the clear or the
    /// re-fetch fails.
    #[instrument(skip_all, fields(authenticated = status.is_authenticated()))]
    pub async fn clear(&mut self, status: &AuthStatus) -> Result<Vec<CartLineItem>> {
        match status {
            AuthStatus::Guest => {
                self.guest.save_or_warn(&[]);
                Ok(Vec::new())
            }
            AuthStatus::Authenticated(session) => {
                self.remote.clear(&session.token).await?;
                Ok(self.remote.fetch(&session.token).await?)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::testing::{FakeRemote, jersey, signed_in};
    use crate::error::CartError;
    use crate::storage::MemoryStorage;
    use jersey_shop_core::{Customization, PatchSet, Size};

    fn line(id: i32) -> CartLineItem {
        CartLineItem::new(jersey(id, 2000), Size::M, Customization::none(), PatchSet::new())
    }

    #[test]
    fn test_guest_cart_roundtrip() {
        let mut guest = GuestCart::new(MemoryStorage::new());
        assert!(guest.load().is_empty());

        guest.save(&[line(1), line(2)]).unwrap();
        let loaded = guest.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], line(1));
    }

    #[test]
    fn test_corrupt_guest_cart_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.set_item(GUEST_CART_KEY, "{not json").unwrap();
        let guest = GuestCart::new(storage);
        assert!(guest.load().is_empty());
    }

    #[test]
    fn test_guest_save_over_quota_fails() {
        let mut guest = GuestCart::new(MemoryStorage::with_quota(8));
        let err = guest.save(&[line(1)]).unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
    }

    #[tokio::test]
    async fn test_guest_add_merges_and_saves() {
        let mut persistence = CartPersistence::new(MemoryStorage::new(), FakeRemote::default());
        let items = persistence
            .add(&AuthStatus::Guest, &[], line(1))
            .await
            .unwrap();
        let items = persistence
            .add(&AuthStatus::Guest, &items, line(1))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity(), 2);
        assert_eq!(persistence.guest().load(), items);
        assert_eq!(persistence.remote().calls(), 0);
    }

    #[tokio::test]
    async fn test_guest_add_survives_full_storage() {
        let mut persistence =
            CartPersistence::new(MemoryStorage::with_quota(4), FakeRemote::default());
        let items = persistence
            .add(&AuthStatus::Guest, &[], line(1))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert!(persistence.guest().load().is_empty());
    }

    #[tokio::test]
    async fn test_remote_add_refetches() {
        let mut persistence = CartPersistence::new(MemoryStorage::new(), FakeRemote::default());
        let status = signed_in();

        persistence.add(&status, &[], line(1)).await.unwrap();
        let items = persistence.add(&status, &[], line(1)).await.unwrap();

        // The server merged both adds; the local `current` was ignored.
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity(), 2);
        assert!(items[0].remote_id.is_some());
        // Guest storage is untouched while signed in.
        assert!(persistence.guest().load().is_empty());
    }

    #[tokio::test]
    async fn test_remote_remove_without_id_is_skipped() {
        let mut persistence = CartPersistence::new(MemoryStorage::new(), FakeRemote::default());
        let local = line(3);
        let result = persistence
            .remove(&signed_in(), &[local.clone()], &local.key())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(persistence.remote().calls(), 0);
    }

    #[tokio::test]
    async fn test_guest_remove_unknown_line_is_skipped() {
        let mut persistence = CartPersistence::new(MemoryStorage::new(), FakeRemote::default());
        let result = persistence
            .remove(&AuthStatus::Guest, &[line(1)], &line(2).key())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_remote_clear() {
        let mut persistence = CartPersistence::new(MemoryStorage::new(), FakeRemote::default());
        let status = signed_in();
        persistence.add(&status, &[], line(1)).await.unwrap();

        let items = persistence.clear(&status).await.unwrap();
        assert!(items.is_empty());
        assert!(persistence.load(&status).await.unwrap().is_empty());
    }
}
