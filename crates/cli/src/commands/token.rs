//! Bearer token management.
//!
//! # Usage
//!
//! ```bash
//! # Issue a token for user 7 that expires in 30 days
//! js-cli token issue --user-id 7 --name "Ana" --days 30
//!
//! # Delete expired tokens
//! js-cli token prune
//! ```
//!
//! The raw token is printed once; only its SHA-256 is stored.

use chrono::{Duration, Utc};
use uuid::Uuid;

use jersey_shop_cart_api::db::{self, ApiTokenRepository};
use jersey_shop_core::UserId;

use super::{CommandError, database_url};

/// Issue a new token for `user_id` and return it.
///
/// # Errors
///
/// Returns an error if `days` is not positive or the insert fails.
pub async fn issue(
    user_id: i32,
    display_name: &str,
    days: Option<i64>,
) -> Result<String, CommandError> {
    let expires_at = match days {
        Some(days) if days <= 0 => {
            return Err(CommandError::Invalid(format!(
                "--days must be positive, got {days}"
            )));
        }
        Some(days) => Some(Utc::now() + Duration::days(days)),
        None => None,
    };

    let pool = db::create_pool(&database_url()?).await?;
    let token = Uuid::new_v4().simple().to_string();

    ApiTokenRepository::new(&pool)
        .create(&token, UserId::new(user_id), display_name, expires_at)
        .await?;

    tracing::info!(user_id, ?expires_at, "Token issued");
    Ok(token)
}

/// Delete expired tokens.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn prune() -> Result<(), CommandError> {
    let pool = db::create_pool(&database_url()?).await?;
    let removed = ApiTokenRepository::new(&pool).delete_expired().await?;
    tracing::info!(removed, "Expired tokens deleted");
    Ok(())
}
