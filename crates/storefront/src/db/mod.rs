//! Database operations for storefront `PostgreSQL`.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `branch` - Restaurant locations that accept orders
//! - `menu_item` - Dishes with current price and availability
//! - `delivery_settings` - Single-row delivery fee configuration
//! - `promo_code` - Administrator-defined discounts with usage counters
//! - `promo_code_usage` - One row per redemption, for per-user limits
//! - `customer_order` / `order_item` - Placed orders with price snapshots
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p saffron-cli -- migrate
//! ```

pub mod branches;
pub mod menu;
pub mod orders;
pub mod promo_codes;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use branches::BranchRepository;
pub use menu::MenuRepository;
pub use orders::OrderRepository;
pub use promo_codes::PromoCodeRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate promo code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, everything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    const MIGRATIONS: [&str; 4] = [
        include_str!("../../migrations/20260301000001_create_schema.sql"),
        include_str!("../../migrations/20260301000002_create_menu.sql"),
        include_str!("../../migrations/20260301000003_create_promo_codes.sql"),
        include_str!("../../migrations/20260301000004_create_orders.sql"),
    ];

    fn created_types(sql: &str) -> Vec<&str> {
        sql.lines()
            .filter_map(|line| line.trim().strip_prefix("CREATE TYPE storefront."))
            .filter_map(|rest| rest.split_whitespace().next())
            .collect()
    }

    #[test]
    fn test_every_enum_type_backs_a_column() {
        let all = MIGRATIONS.concat();
        let types = created_types(&all);
        assert_eq!(types, ["delivery_type", "discount_kind", "order_status"]);

        for name in types {
            let uses = all.matches(&format!("storefront.{name} ")).count();
            assert!(uses > 1, "storefront.{name} is not used by any column");
        }
    }
}
