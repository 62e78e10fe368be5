//! Catalog lookup backed by the storefront database.
//!
//! Implements the cart engine's [`Catalog`] trait over the `items` table.
//! Only published rows are visible to the cart: an unpublished item behaves
//! exactly like a deleted one and gets pruned at the next recompute.

use sqlx::PgPool;

use vegeket_cart::{Catalog, CatalogError, CatalogItem};
use vegeket_core::{ItemId, Price};

/// Read-only item lookup for cart pricing.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    /// Create a new catalog service over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Catalog for CatalogService {
    async fn get_item(&self, id: &ItemId) -> Result<Option<CatalogItem>, CatalogError> {
        let row: Option<(ItemId, String, Price, Option<String>)> = sqlx::query_as(
            "SELECT id, name, price, image FROM items WHERE id = $1 AND is_published",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(CatalogError::new)?;

        Ok(row.map(|(id, name, price, image)| CatalogItem {
            id,
            name,
            price,
            image,
        }))
    }
}
