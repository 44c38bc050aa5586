//! Per-user cart repository.

use sqlx::{FromRow, PgPool};
use tracing::instrument;

use jersey_shop_core::{
    AddCartItemRequest, CartItemId, CartItemResponse, Customization, JerseyId, PatchSet, Price,
    Size, UserId,
};

use super::{CatalogRepository, RepositoryError};

const CART_ITEM_COLUMNS: &str =
    "id, jersey_id, size, quantity, custom_name, custom_number, patches, final_price";

/// Columns of the `uq_cart_item_line` unique index.
const LINE_IDENTITY: &str = "user_id, jersey_id, size, custom_name, custom_number, patches";

/// Insert a line, or add to the quantity of the row with the same identity.
///
/// A single statement, so concurrent identical adds serialise on the unique
/// index and never produce two rows. The stored unit price is kept.
fn upsert_sql() -> String {
    format!(
        r"
        INSERT INTO cart.cart_item
            (user_id, jersey_id, size, quantity, custom_name, custom_number, patches, final_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT ({LINE_IDENTITY})
        DO UPDATE SET quantity = cart.cart_item.quantity + EXCLUDED.quantity
        RETURNING {CART_ITEM_COLUMNS}
        "
    )
}

#[derive(FromRow)]
struct CartItemRow {
    id: CartItemId,
    jersey_id: JerseyId,
    size: String,
    quantity: i32,
    custom_name: Option<String>,
    custom_number: Option<String>,
    patches: Vec<String>,
    final_price: Price,
}

/// An add request normalised for storage and matching.
///
/// Blank name/number become NULL and patches are sorted and de-duplicated,
/// so equal configurations always land on the same row.
struct NormalizedItem {
    jersey_id: JerseyId,
    size: Size,
    quantity: i32,
    custom_name: Option<String>,
    custom_number: Option<String>,
    patches: Vec<String>,
    final_price: Price,
}

impl NormalizedItem {
    fn from_request(request: &AddCartItemRequest) -> Result<Self, RepositoryError> {
        let quantity = i32::try_from(request.quantity)
            .map_err(|_| RepositoryError::DataCorruption("quantity out of range".to_owned()))?;
        let customization =
            Customization::new(request.custom_name.clone(), request.custom_number.clone());
        let patches: PatchSet = request.patches.iter().map(String::as_str).collect();

        Ok(Self {
            jersey_id: request.jersey_id,
            size: request.size,
            quantity,
            custom_name: customization.name,
            custom_number: customization.number,
            patches: patches.to_vec(),
            final_price: request.final_price,
        })
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All items in the user's cart, oldest first, with jersey snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItemResponse>, RepositoryError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart.cart_item WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.with_jerseys(rows).await
    }

    /// Add `request.quantity` units of a configuration.
    ///
    /// An existing row with the same jersey, size, name, number and patch
    /// set has its quantity increased; otherwise a row is inserted. Both
    /// happen in one upsert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the jersey does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, request), fields(jersey_id = %request.jersey_id, size = %request.size))]
    pub async fn add(
        &self,
        user_id: UserId,
        request: &AddCartItemRequest,
    ) -> Result<CartItemResponse, RepositoryError> {
        let item = NormalizedItem::from_request(request)?;

        let catalog = CatalogRepository::new(self.pool);
        let jersey = catalog
            .get_jersey(item.jersey_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let row: CartItemRow = sqlx::query_as(&upsert_sql())
            .bind(user_id)
            .bind(item.jersey_id)
            .bind(item.size.as_str())
            .bind(item.quantity)
            .bind(&item.custom_name)
            .bind(&item.custom_number)
            .bind(&item.patches)
            .bind(item.final_price)
            .fetch_one(self.pool)
            .await?;

        let mut response = row_to_response(row)?;
        response.jersey = Some(jersey);
        Ok(response)
    }

    /// Remove one item owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such item.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: UserId, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart.cart_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every item owned by the user. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn with_jerseys(
        &self,
        rows: Vec<CartItemRow>,
    ) -> Result<Vec<CartItemResponse>, RepositoryError> {
        let mut ids: Vec<JerseyId> = rows.iter().map(|r| r.jersey_id).collect();
        ids.sort_by_key(JerseyId::as_i32);
        ids.dedup();
        let jerseys = CatalogRepository::new(self.pool).get_jerseys(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let jersey = jerseys.get(&row.jersey_id).cloned();
                let mut response = row_to_response(row)?;
                response.jersey = jersey;
                Ok(response)
            })
            .collect()
    }
}

fn row_to_response(row: CartItemRow) -> Result<CartItemResponse, RepositoryError> {
    let size: Size = row.size.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("cart item {}: {e}", row.id))
    })?;
    let quantity = u32::try_from(row.quantity).map_err(|_| {
        RepositoryError::DataCorruption(format!(
            "cart item {}: negative quantity {}",
            row.id, row.quantity
        ))
    })?;

    Ok(CartItemResponse {
        id: row.id,
        jersey_id: row.jersey_id,
        jersey: None,
        size,
        quantity,
        custom_name: row.custom_name,
        custom_number: row.custom_number,
        patches: row.patches,
        final_price: row.final_price,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(size: &str, quantity: i32) -> CartItemRow {
        CartItemRow {
            id: CartItemId::new(1),
            jersey_id: JerseyId::new(2),
            size: size.to_owned(),
            quantity,
            custom_name: None,
            custom_number: Some("7".to_owned()),
            patches: vec!["Liga".to_owned()],
            final_price: Price::from_cents(2300),
        }
    }

    #[test]
    fn test_normalize_sorts_patches_and_drops_blanks() {
        let request = AddCartItemRequest {
            jersey_id: JerseyId::new(2),
            size: Size::M,
            quantity: 1,
            custom_name: Some(String::new()),
            custom_number: Some("7".to_owned()),
            patches: vec!["Liga Europa".to_owned(), "Liga".to_owned(), "Liga".to_owned()],
            final_price: Price::from_cents(2700),
        };
        let item = NormalizedItem::from_request(&request).unwrap();
        assert_eq!(item.custom_name, None);
        assert_eq!(item.custom_number.as_deref(), Some("7"));
        assert_eq!(item.patches, vec!["Liga".to_owned(), "Liga Europa".to_owned()]);
    }

    #[test]
    fn test_upsert_conflicts_on_line_identity_index() {
        let migration = include_str!("../../migrations/20260301000003_unique_cart_line.sql");
        assert!(migration.contains(&format!("({LINE_IDENTITY})")));
        assert!(migration.contains("NULLS NOT DISTINCT"));

        let sql = upsert_sql();
        assert!(sql.contains(&format!("ON CONFLICT ({LINE_IDENTITY})")));
        assert!(sql.contains("quantity = cart.cart_item.quantity + EXCLUDED.quantity"));
        assert!(!sql.contains("final_price = EXCLUDED"));
    }

    #[test]
    fn test_row_to_response() {
        let response = row_to_response(row("XL", 3)).unwrap();
        assert_eq!(response.size, Size::XL);
        assert_eq!(response.quantity, 3);
        assert!(response.jersey.is_none());
    }

    #[test]
    fn test_corrupt_rows_are_reported() {
        assert!(matches!(
            row_to_response(row("XS", 1)),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert!(matches!(
            row_to_response(row("M", -1)),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
