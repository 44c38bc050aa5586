//! Jersey Shop Core - Shared types library.
//!
//! This crate provides the types used across all Jersey Shop components:
//! - `storefront` - Client-side cart engine (guest and signed-in carts)
//! - `cart-api` - Per-user server-side cart resource
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used on both sides of the cart API.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, sizes, catalog snapshots and cart lines
//! - [`pricing`] - Unit price composition and tiered quantity discounts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::CartTotals;
pub use types::*;
