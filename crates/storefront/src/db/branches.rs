//! Branch repository.

use sqlx::PgPool;

use saffron_core::BranchId;

use super::RepositoryError;
use crate::models::Branch;

/// Repository for restaurant branches.
pub struct BranchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BranchRepository<'a> {
    /// Create a new branch repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Branches currently accepting orders, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Branch>, RepositoryError> {
        let branches = sqlx::query_as::<_, Branch>(
            r"
            SELECT id, name, address, phone, is_active
            FROM storefront.branch
            WHERE is_active
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(branches)
    }

    /// Get a branch by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BranchId) -> Result<Option<Branch>, RepositoryError> {
        let branch = sqlx::query_as::<_, Branch>(
            r"
            SELECT id, name, address, phone, is_active
            FROM storefront.branch
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(branch)
    }
}
