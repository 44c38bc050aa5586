//! Bearer token lookup.
//!
//! Only the SHA-256 of a token is stored. The login service (outside this
//! API) issues tokens; `js-cli token issue` mints one for local testing.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use jersey_shop_core::UserId;

use super::RepositoryError;

/// The user a bearer token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TokenOwner {
    pub user_id: UserId,
    pub display_name: String,
}

/// Hash a raw bearer token for storage or lookup.
#[must_use]
pub fn hash_token(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

/// Repository for API token operations.
pub struct ApiTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApiTokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the owner of an unexpired token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip_all)]
    pub async fn find_by_token(&self, token: &str) -> Result<Option<TokenOwner>, RepositoryError> {
        let owner = sqlx::query_as(
            r"
            SELECT user_id, display_name
            FROM cart.api_token
            WHERE token_hash = $1
              AND (expires_at IS NULL OR expires_at > NOW())
            ",
        )
        .bind(hash_token(token))
        .fetch_optional(self.pool)
        .await?;
        Ok(owner)
    }

    /// Register a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, token))]
    pub async fn create(
        &self,
        token: &str,
        user_id: UserId,
        display_name: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart.api_token (token_hash, user_id, display_name, expires_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(hash_token(token))
        .bind(user_id)
        .bind(display_name)
        .bind(expires_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Delete expired tokens. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart.api_token WHERE expires_at <= NOW()")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
