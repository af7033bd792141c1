//! Menu repository.
//!
//! The catalog lookup used for pricing always reads current prices here,
//! never from the client.

use sqlx::PgPool;

use saffron_core::{CatalogItem, LineItem};

use super::RepositoryError;
use crate::models::MenuItem;

/// Repository for menu items.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Available menu items grouped by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let items = sqlx::query_as::<_, MenuItem>(
            r"
            SELECT id, category, name, description, price, is_available, updated_at
            FROM storefront.menu_item
            WHERE is_available
            ORDER BY category, sort_order, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Catalog entries for every item referenced by a cart.
    ///
    /// Unavailable items are returned too; the pricing engine decides what
    /// to reject.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn catalog_for(&self, items: &[LineItem]) -> Result<Vec<CatalogItem>, RepositoryError> {
        let mut ids: Vec<i32> = items.iter().map(|line| line.item_id.as_i32()).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let catalog = sqlx::query_as::<_, CatalogItem>(
            r"
            SELECT id, name, price, is_available
            FROM storefront.menu_item
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(catalog)
    }
}
