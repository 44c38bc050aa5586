//! The cart store: current items, drawer state and derived totals.
//!
//! Every mutation goes through the persistence strategy for the current
//! auth status. Failures are logged and reported as
//! [`MutationOutcome::Failed`]; the items are then left as they were.

use serde::Serialize;
use tracing::{error, info, instrument};

use jersey_shop_core::pricing::{self, CartTotals};
use jersey_shop_core::{CartLineItem, Customization, Jersey, JerseyId, LineKey, PatchSet, Size};

use super::persistence::CartPersistence;
use crate::models::AuthStatus;
use crate::remote::RemoteCart;
use crate::storage::LocalStorage;

/// What a mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The cart changed (or was confirmed by the server).
    Applied,
    /// Nothing to do, e.g. removing a line that is not in the cart.
    Skipped,
    /// The backend failed; the cart is unchanged.
    Failed,
}

impl MutationOutcome {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Items and totals handed to checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
}

/// Add one unit of `line`: bump the quantity of a matching line or append.
pub(crate) fn merge_line(items: &mut Vec<CartLineItem>, line: CartLineItem) {
    let key = line.key();
    match items.iter_mut().find(|item| item.matches(&key)) {
        Some(existing) => existing.increment(),
        None => items.push(line),
    }
}

/// Drop the first line matching `key`. Returns false if none matched.
pub(crate) fn remove_line(items: &mut Vec<CartLineItem>, key: &LineKey) -> bool {
    match items.iter().position(|item| item.matches(key)) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

/// Cart state for one storefront session.
#[derive(Debug)]
pub struct CartStore<S, R> {
    items: Vec<CartLineItem>,
    drawer_open: bool,
    loading: bool,
    status: AuthStatus,
    persistence: CartPersistence<S, R>,
}

impl<S: LocalStorage, R: RemoteCart> CartStore<S, R> {
    /// An empty guest cart. Nothing is loaded until the sync controller
    /// starts or [`reload`](Self::reload) is called.
    pub fn new(persistence: CartPersistence<S, R>) -> Self {
        Self {
            items: Vec::new(),
            drawer_open: false,
            loading: false,
            status: AuthStatus::Guest,
            persistence,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub const fn status(&self) -> &AuthStatus {
        &self.status
    }

    #[must_use]
    pub const fn persistence(&self) -> &CartPersistence<S, R> {
        &self.persistence
    }

    /// True while a load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |sum, item| sum.saturating_add(item.quantity()))
    }

    /// Subtotal, volume discount and final total.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        pricing::compute_totals(&self.items)
    }

    /// Snapshot for the checkout page.
    #[must_use]
    pub fn checkout_summary(&self) -> CheckoutSummary {
        CheckoutSummary {
            items: self.items.clone(),
            totals: self.totals(),
        }
    }

    // =========================================================================
    // Drawer
    // =========================================================================

    #[must_use]
    pub const fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    pub const fn toggle_drawer(&mut self) {
        self.drawer_open = !self.drawer_open;
    }

    pub const fn open_drawer(&mut self) {
        self.drawer_open = true;
    }

    pub const fn close_drawer(&mut self) {
        self.drawer_open = false;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of a configured jersey and open the drawer.
    ///
    /// The unit price is fixed now from the jersey's current base price.
    /// Signed-in carts are replaced by the server's view after the add.
    #[instrument(skip_all, fields(jersey_id = %jersey.id, size = %size))]
    pub async fn add_item(
        &mut self,
        jersey: Jersey,
        size: Size,
        customization: Customization,
        patches: PatchSet,
    ) -> MutationOutcome {
        let line = CartLineItem::new(jersey, size, customization, patches);
        let outcome = match self.persistence.add(&self.status, &self.items, line).await {
            Ok(items) => {
                self.items = items;
                MutationOutcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Failed to add item to cart");
                MutationOutcome::Failed
            }
        };
        // The drawer opens even when the add failed.
        self.drawer_open = true;
        outcome
    }

    /// Remove the whole line with this configuration.
    #[instrument(skip_all, fields(jersey_id = %jersey_id, size = %size))]
    pub async fn remove_item(
        &mut self,
        jersey_id: JerseyId,
        size: Size,
        customization: Customization,
        patches: PatchSet,
    ) -> MutationOutcome {
        let key = LineKey::new(jersey_id, size, customization, patches);
        match self.persistence.remove(&self.status, &self.items, &key).await {
            Ok(Some(items)) => {
                self.items = items;
                MutationOutcome::Applied
            }
            Ok(None) => MutationOutcome::Skipped,
            Err(e) => {
                error!(error = %e, "Failed to remove item from cart");
                MutationOutcome::Failed
            }
        }
    }

    /// Remove every line.
    #[instrument(skip_all)]
    pub async fn clear(&mut self) -> MutationOutcome {
        match self.persistence.clear(&self.status).await {
            Ok(items) => {
                self.items = items;
                MutationOutcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Failed to clear cart");
                MutationOutcome::Failed
            }
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the items with whatever the current strategy holds.
    ///
    /// A failed load leaves the cart empty.
    #[instrument(skip_all, fields(authenticated = self.status.is_authenticated()))]
    pub async fn reload(&mut self) {
        self.loading = true;
        match self.persistence.load(&self.status).await {
            Ok(items) => {
                info!(lines = items.len(), "Cart loaded");
                self.items = items;
            }
            Err(e) => {
                error!(error = %e, "Failed to load cart");
                self.items.clear();
            }
        }
        self.loading = false;
    }

    /// Switch to a new auth status, dropping the in-memory items.
    ///
    /// Callers follow this with [`reload`](Self::reload).
    pub(crate) fn set_status(&mut self, status: AuthStatus) {
        self.items.clear();
        self.status = status;
    }
}
