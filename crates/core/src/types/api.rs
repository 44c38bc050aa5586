//! Wire types shared by the cart API and its client.

use serde::{Deserialize, Serialize};

use super::cart::{CartItemError, CartLineItem, Customization, PatchSet};
use super::catalog::Jersey;
use super::id::{CartItemId, JerseyId};
use super::price::Price;
use super::size::Size;

/// Body of `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCartItemRequest {
    pub jersey_id: JerseyId,
    pub size: Size,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_number: Option<String>,
    #[serde(default)]
    pub patches: Vec<String>,
    /// Unit price as computed by the client when the line was created.
    pub final_price: Price,
}

const fn default_quantity() -> u32 {
    1
}

impl From<&CartLineItem> for AddCartItemRequest {
    /// One unit of the given line's configuration.
    fn from(line: &CartLineItem) -> Self {
        Self {
            jersey_id: line.jersey.id,
            size: line.size,
            quantity: 1,
            custom_name: line.customization.name.clone(),
            custom_number: line.customization.number.clone(),
            patches: line.patches.to_vec(),
            final_price: line.final_unit_price,
        }
    }
}

/// One stored cart item as returned by `GET /cart` and `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub id: CartItemId,
    pub jersey_id: JerseyId,
    /// Catalog snapshot; absent if the jersey no longer exists.
    #[serde(default)]
    pub jersey: Option<Jersey>,
    pub size: Size,
    pub quantity: u32,
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default)]
    pub custom_number: Option<String>,
    #[serde(default)]
    pub patches: Vec<String>,
    pub final_price: Price,
}

/// Reasons a stored cart item cannot become a [`CartLineItem`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartItemConversionError {
    /// The jersey was deleted from the catalog.
    #[error("cart item {0} has no jersey")]
    MissingJersey(CartItemId),
    #[error("cart item {id}: {source}")]
    Invalid {
        id: CartItemId,
        source: CartItemError,
    },
}

impl TryFrom<CartItemResponse> for CartLineItem {
    type Error = CartItemConversionError;

    fn try_from(item: CartItemResponse) -> Result<Self, Self::Error> {
        let jersey = item
            .jersey
            .ok_or(CartItemConversionError::MissingJersey(item.id))?;
        Self::from_parts(
            Some(item.id),
            jersey,
            item.size,
            item.quantity,
            Customization::new(item.custom_name, item.custom_number),
            item.patches.into_iter().collect::<PatchSet>(),
            item.final_price,
        )
        .map_err(|source| CartItemConversionError::Invalid {
            id: item.id,
            source,
        })
    }
}

/// A page of results from a paginated catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}
