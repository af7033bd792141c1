//! Delivery settings command.

use rust_decimal::Decimal;

use saffron_core::DeliverySettings;
use saffron_storefront::db::settings;

use super::{CommandError, connect};

/// Store the delivery fee and free-delivery threshold.
///
/// # Errors
///
/// Returns an error if an amount is negative or the database update fails.
pub async fn set_delivery(base_fee: Decimal, free_threshold: Decimal) -> Result<(), CommandError> {
    let new = delivery_settings(base_fee, free_threshold)?;
    let pool = connect().await?;

    settings::set_delivery_settings(&pool, &new).await?;
    tracing::info!(
        base_fee = %new.base_fee,
        free_threshold = %new.free_threshold,
        "Delivery settings updated"
    );
    Ok(())
}

fn delivery_settings(
    base_fee: Decimal,
    free_threshold: Decimal,
) -> Result<DeliverySettings, CommandError> {
    if base_fee.is_sign_negative() {
        return Err(CommandError::NegativeAmount("base fee"));
    }
    if free_threshold.is_sign_negative() {
        return Err(CommandError::NegativeAmount("free delivery threshold"));
    }
    Ok(DeliverySettings {
        base_fee,
        free_threshold,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_amounts_are_rejected() {
        assert!(matches!(
            delivery_settings(Decimal::new(-1, 0), Decimal::TEN),
            Err(CommandError::NegativeAmount("base fee"))
        ));
        assert!(matches!(
            delivery_settings(Decimal::ONE, Decimal::new(-5, 1)),
            Err(CommandError::NegativeAmount("free delivery threshold"))
        ));
    }

    #[test]
    fn test_zero_fee_is_allowed() {
        let settings = delivery_settings(Decimal::ZERO, Decimal::new(3000, 2)).unwrap();
        assert_eq!(settings.base_fee, Decimal::ZERO);
        assert_eq!(settings.free_threshold, Decimal::new(30, 0));
    }
}
