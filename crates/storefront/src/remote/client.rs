//! HTTP implementation of [`RemoteCart`].

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};
use url::Url;

use jersey_shop_core::{AddCartItemRequest, CartItemId, CartItemResponse, CartLineItem};

use super::{RemoteCart, RemoteCartError};
use crate::config::StorefrontConfig;

/// Client for the cart API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct RemoteCartClient {
    inner: Arc<RemoteCartClientInner>,
}

struct RemoteCartClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl RemoteCartClient {
    /// Create a new cart API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, RemoteCartError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RemoteCartClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    fn url(&self, path: &str) -> Result<Url, RemoteCartError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Turn a non-success response into an error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteCartError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(RemoteCartError::Unauthorized);
        }
        let message = response.text().await.unwrap_or_default();
        Err(RemoteCartError::Api {
            status: status.as_u16(),
            message: message.chars().take(200).collect(),
        })
    }
}

impl RemoteCart for RemoteCartClient {
    #[instrument(skip_all)]
    async fn fetch(&self, token: &SecretString) -> Result<Vec<CartLineItem>, RemoteCartError> {
        let response = self
            .inner
            .client
            .get(self.url("cart")?)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        let items: Vec<CartItemResponse> = Self::check(response).await?.json().await?;

        let total = items.len();
        let lines: Vec<CartLineItem> = items
            .into_iter()
            .filter_map(|item| match CartLineItem::try_from(item) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed cart item");
                    None
                }
            })
            .collect();
        debug!(total, kept = lines.len(), "Fetched remote cart");
        Ok(lines)
    }

    #[instrument(skip_all, fields(jersey_id = %item.jersey_id, size = %item.size))]
    async fn add(
        &self,
        token: &SecretString,
        item: &AddCartItemRequest,
    ) -> Result<(), RemoteCartError> {
        let response = self
            .inner
            .client
            .post(self.url("cart")?)
            .bearer_auth(token.expose_secret())
            .json(item)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn remove(&self, token: &SecretString, id: CartItemId) -> Result<(), RemoteCartError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("cart/{id}"))?)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn clear(&self, token: &SecretString) -> Result<(), RemoteCartError> {
        let response = self
            .inner
            .client
            .delete(self.url("cart")?)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
