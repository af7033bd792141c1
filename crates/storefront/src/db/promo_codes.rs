//! Promo code repository.
//!
//! Reads feed the pricing engine. Redemption bookkeeping runs inside the
//! order transaction via [`consume`] and [`record_usage`].

use sqlx::{PgConnection, PgPool};

use saffron_core::{NewPromoCode, OrderId, PromoCode, PromoCodeId, UserId};

use super::RepositoryError;

const PROMO_COLUMNS: &str = r"
    id, code, kind, value, min_order_amount, max_discount,
    usage_limit, per_user_limit, starts_at, ends_at, is_active, usage_count
";

/// Repository for promo codes.
pub struct PromoCodeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromoCodeRepository<'a> {
    /// Create a new promo code repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a code regardless of case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, RepositoryError> {
        let query = format!(
            "SELECT {PROMO_COLUMNS} FROM storefront.promo_code WHERE LOWER(code) = LOWER($1)"
        );
        let promo = sqlx::query_as::<_, PromoCode>(&query)
            .bind(code.trim())
            .fetch_optional(self.pool)
            .await?;

        Ok(promo)
    }

    /// How many orders this account has placed with the code.
    ///
    /// Cancelled orders give the redemption back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_user_usages(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
    ) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM storefront.promo_code_usage u
            JOIN storefront.customer_order o ON o.id = u.order_id
            WHERE u.promo_code_id = $1
              AND u.user_id = $2
              AND o.status <> 'cancelled'
            ",
        )
        .bind(promo_code_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// All codes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<PromoCode>, RepositoryError> {
        let query =
            format!("SELECT {PROMO_COLUMNS} FROM storefront.promo_code ORDER BY created_at DESC");
        let promos = sqlx::query_as::<_, PromoCode>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(promos)
    }

    /// Store a new code. The definition must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code exists in any casing.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewPromoCode) -> Result<PromoCode, RepositoryError> {
        let query = format!(
            r"
            INSERT INTO storefront.promo_code (
                code, kind, value, min_order_amount, max_discount,
                usage_limit, per_user_limit, starts_at, ends_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PROMO_COLUMNS}
            "
        );
        let code = new.normalized_code();
        let promo = sqlx::query_as::<_, PromoCode>(&query)
            .bind(&code)
            .bind(new.kind)
            .bind(new.value)
            .bind(new.min_order_amount)
            .bind(new.max_discount)
            .bind(new.usage_limit)
            .bind(new.per_user_limit)
            .bind(new.starts_at)
            .bind(new.ends_at)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_insert(e, &format!("promo code {code} already exists"))
            })?;

        Ok(promo)
    }

    /// Enable or disable a code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no code has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_active(
        &self,
        id: PromoCodeId,
        is_active: bool,
    ) -> Result<PromoCode, RepositoryError> {
        let query = format!(
            "UPDATE storefront.promo_code SET is_active = $2 WHERE id = $1 RETURNING {PROMO_COLUMNS}"
        );
        sqlx::query_as::<_, PromoCode>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Enable or disable a code by its text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no code matches.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_active_by_code(
        &self,
        code: &str,
        is_active: bool,
    ) -> Result<PromoCode, RepositoryError> {
        let promo = self
            .find_by_code(code)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        self.set_active(promo.id, is_active).await
    }
}

/// Take one redemption from the global counter.
///
/// Returns `false` when the usage limit was reached by a concurrent
/// checkout after validation; the caller must roll back.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn consume(
    conn: &mut PgConnection,
    promo_code_id: PromoCodeId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE storefront.promo_code
        SET usage_count = usage_count + 1
        WHERE id = $1
          AND is_active
          AND (usage_limit IS NULL OR usage_count < usage_limit)
        ",
    )
    .bind(promo_code_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Record which account redeemed a code on which order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn record_usage(
    conn: &mut PgConnection,
    promo_code_id: PromoCodeId,
    user_id: Option<UserId>,
    order_id: OrderId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO storefront.promo_code_usage (promo_code_id, user_id, order_id)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(promo_code_id)
    .bind(user_id)
    .bind(order_id)
    .execute(conn)
    .await?;

    Ok(())
}
