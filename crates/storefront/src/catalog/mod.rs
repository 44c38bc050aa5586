//! Catalog API client.
//!
//! Uses `reqwest` for HTTP and caches single-jersey lookups with `moka`
//! (5-minute TTL). Listings are not cached; they depend on filters and
//! pagination and are only read once per page view.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use jersey_shop_core::{Jersey, JerseyId, Page};

use crate::config::StorefrontConfig;

/// Errors that can occur when reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The jersey does not exist.
    #[error("Jersey not found: {0}")]
    NotFound(JerseyId),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Building a request URL failed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Filters and pagination for [`CatalogClient::list_jerseys`].
#[derive(Debug, Clone, Default)]
pub struct JerseyQuery {
    pub search: Option<String>,
    pub team_id: Option<i32>,
    pub league_id: Option<i32>,
    pub main_color: Option<String>,
    /// `newest`, `price_asc` or `price_desc`.
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl JerseyQuery {
    fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.append_pair("search", search);
        }
        if let Some(team_id) = self.team_id {
            pairs.append_pair("team_id", &team_id.to_string());
        }
        if let Some(league_id) = self.league_id {
            pairs.append_pair("league_id", &league_id.to_string());
        }
        if let Some(main_color) = self.main_color.as_deref().filter(|s| !s.is_empty()) {
            pairs.append_pair("main_color", main_color);
        }
        if let Some(sort_by) = self.sort_by.as_deref().filter(|s| !s.is_empty()) {
            pairs.append_pair("sort_by", sort_by);
        }
        if let Some(page) = self.page {
            pairs.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
    }
}

/// Client for the catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<JerseyId, Jersey>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// Get a jersey by ID, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the catalog has no such jersey.
    #[instrument(skip(self))]
    pub async fn get_jersey(&self, id: JerseyId) -> Result<Jersey, CatalogError> {
        if let Some(jersey) = self.inner.cache.get(&id).await {
            debug!("Cache hit for jersey");
            return Ok(jersey);
        }

        let url = self.inner.base_url.join(&format!("catalog/jerseys/{id}"))?;
        let response = self.inner.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        let jersey: Jersey = Self::check(response).await?.json().await?;

        self.inner.cache.insert(id, jersey.clone()).await;
        Ok(jersey)
    }

    /// List jerseys matching a query.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_jerseys(&self, query: &JerseyQuery) -> Result<Page<Jersey>, CatalogError> {
        let mut url = self.inner.base_url.join("catalog/jerseys")?;
        query.apply(&mut url);

        let response = self.inner.client.get(url).send().await?;
        let page: Page<Jersey> = Self::check(response).await?.json().await?;

        // Listings carry full jerseys, so warm the single-item cache.
        for jersey in &page.data {
            self.inner.cache.insert(jersey.id, jersey.clone()).await;
        }
        Ok(page)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(CatalogError::Api {
            status: status.as_u16(),
            message: message.chars().take(200).collect(),
        })
    }
}
