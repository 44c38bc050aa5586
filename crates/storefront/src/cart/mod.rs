//! Shopping cart engine.
//!
//! # Layers
//!
//! - [`CartStore`] - items, drawer state, totals; every mutation reports a
//!   [`MutationOutcome`] and never returns an error
//! - [`CartPersistence`] - guest storage or the cart API, chosen by the
//!   current [`AuthStatus`](crate::models::AuthStatus)
//! - [`SyncController`] - follows the [`AuthSignal`] and reloads the store
//!   on sign-in and sign-out
//! - [`CartEngine`] - the three wired together behind a shared lock

mod persistence;
mod store;
mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use persistence::{CartPersistence, GUEST_CART_KEY, GuestCart};
pub use store::{CartStore, CheckoutSummary, MutationOutcome};
pub use sync::{AuthSignal, CartEngine, SyncController};
