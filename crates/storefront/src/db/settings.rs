//! Delivery settings storage.

use sqlx::PgPool;

use saffron_core::DeliverySettings;

use super::RepositoryError;

/// Read the stored delivery settings, if an operator has saved any.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_delivery_settings(
    pool: &PgPool,
) -> Result<Option<DeliverySettings>, RepositoryError> {
    let settings = sqlx::query_as::<_, DeliverySettings>(
        r"
        SELECT base_fee, free_threshold
        FROM storefront.delivery_settings
        WHERE id = 1
        ",
    )
    .fetch_optional(pool)
    .await?;

    Ok(settings)
}

/// Store delivery settings, replacing the previous values.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn set_delivery_settings(
    pool: &PgPool,
    settings: &DeliverySettings,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO storefront.delivery_settings (id, base_fee, free_threshold)
        VALUES (1, $1, $2)
        ON CONFLICT (id) DO UPDATE
            SET base_fee = $1, free_threshold = $2, updated_at = NOW()
        ",
    )
    .bind(settings.base_fee)
    .bind(settings.free_threshold)
    .execute(pool)
    .await?;

    Ok(())
}
