//! Client side of the per-user server cart.
//!
//! # Architecture
//!
//! - [`RemoteCart`] is the seam the cart engine depends on
//! - [`RemoteCartClient`] implements it over HTTP with `reqwest`
//! - Every call is scoped by the signed-in customer's bearer token
//!
//! # Endpoints
//!
//! ```text
//! GET    /cart        - All items of the current user
//! POST   /cart        - Add one unit (server merges identical configurations)
//! DELETE /cart/{id}   - Remove one item
//! DELETE /cart        - Remove every item
//! ```

mod client;

use std::future::Future;

use secrecy::SecretString;
use thiserror::Error;

use jersey_shop_core::{AddCartItemRequest, CartItemId, CartLineItem};

pub use client::RemoteCartClient;

/// Errors that can occur when talking to the cart API.
#[derive(Debug, Error)]
pub enum RemoteCartError {
    /// HTTP request failed (connection, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token was rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Building a request URL failed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A per-user cart stored on the server.
pub trait RemoteCart: Send + Sync {
    /// Fetch every line of the user's cart.
    fn fetch(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<CartLineItem>, RemoteCartError>> + Send;

    /// Add one unit of a configuration.
    fn add(
        &self,
        token: &SecretString,
        item: &AddCartItemRequest,
    ) -> impl Future<Output = Result<(), RemoteCartError>> + Send;

    /// Remove one line by its server id.
    fn remove(
        &self,
        token: &SecretString,
        id: CartItemId,
    ) -> impl Future<Output = Result<(), RemoteCartError>> + Send;

    /// Remove every line.
    fn clear(&self, token: &SecretString)
    -> impl Future<Output = Result<(), RemoteCartError>> + Send;
}
