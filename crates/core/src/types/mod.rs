//! Core types for Jersey Shop.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod api;
pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;
pub mod size;

pub use api::{AddCartItemRequest, CartItemConversionError, CartItemResponse, Page};
pub use cart::{CartItemError, CartLineItem, Customization, LineKey, PatchSet, STANDARD_PATCHES};
pub use catalog::{Jersey, JerseyImage, JerseyType};
pub use id::*;
pub use price::{Price, PriceError};
pub use size::{Size, SizeError};
