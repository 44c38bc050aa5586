//! Jersey Shop storefront cart engine.
//!
//! Holds the customer's cart, prices it, and keeps it in the right place:
//! on this device while browsing as a guest, on the cart API once signed
//! in. The catalog client lives here too, since cart lines are built from
//! catalog jerseys.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod storage;

pub use cart::{AuthSignal, CartEngine, CartStore, MutationOutcome};
pub use config::StorefrontConfig;
pub use error::CartError;
