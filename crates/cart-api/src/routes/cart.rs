//! Cart route handlers.
//!
//! Every handler is scoped to the user behind the bearer token; one user can
//! never read or modify another user's lines.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use jersey_shop_core::{AddCartItemRequest, CartItemId, CartItemResponse};

use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// All lines in the caller's cart.
#[instrument(skip_all, fields(user_id = %owner.user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
) -> Result<Json<Vec<CartItemResponse>>> {
    let items = CartRepository::new(state.pool()).list(owner.user_id).await?;
    Ok(Json(items))
}

/// Add a line, merging with an identical configuration.
#[instrument(skip_all, fields(user_id = %owner.user_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(request): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartItemResponse>)> {
    validate(&request)?;

    let item = CartRepository::new(state.pool())
        .add(owner.user_id, &request)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Jersey not found".to_owned()),
            other => other.into(),
        })?;

    info!(cart_item_id = %item.id, quantity = item.quantity, "Cart line saved");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Remove one line.
#[instrument(skip_all, fields(user_id = %owner.user_id, cart_item_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool())
        .remove(owner.user_id, id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Cart item not found".to_owned()),
            other => other.into(),
        })?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove every line.
#[instrument(skip_all, fields(user_id = %owner.user_id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
) -> Result<StatusCode> {
    let removed = CartRepository::new(state.pool()).clear(owner.user_id).await?;
    info!(removed, "Cart cleared");
    Ok(StatusCode::NO_CONTENT)
}

fn validate(request: &AddCartItemRequest) -> Result<()> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_owned()));
    }
    if request.final_price.amount().is_sign_negative() {
        return Err(AppError::BadRequest("final_price must not be negative".to_owned()));
    }
    Ok(())
}
