//! Delivery fee rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.delivery_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    #[default]
    Pickup,
    Delivery,
}

/// Delivery fee configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct DeliverySettings {
    /// Fee charged for delivery below the threshold.
    pub base_fee: Decimal,
    /// Subtotal at or above which delivery is free.
    pub free_threshold: Decimal,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            base_fee: Decimal::new(500, 2),
            free_threshold: Decimal::new(5000, 2),
        }
    }
}

/// Delivery fee for an order with the given subtotal.
#[must_use]
pub fn compute_delivery_fee(
    delivery: DeliveryType,
    subtotal: Decimal,
    settings: &DeliverySettings,
) -> Decimal {
    match delivery {
        DeliveryType::Pickup => Decimal::ZERO,
        DeliveryType::Delivery if subtotal >= settings.free_threshold => Decimal::ZERO,
        DeliveryType::Delivery => settings.base_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DeliverySettings {
        DeliverySettings {
            base_fee: Decimal::TEN,
            free_threshold: Decimal::ONE_HUNDRED,
        }
    }

    #[test]
    fn test_pickup_is_free() {
        for subtotal in [Decimal::ZERO, Decimal::new(55, 0), Decimal::new(500, 0)] {
            assert_eq!(
                compute_delivery_fee(DeliveryType::Pickup, subtotal, &settings()),
                Decimal::ZERO
            );
        }
    }

    #[test]
    fn test_delivery_below_threshold() {
        assert_eq!(
            compute_delivery_fee(DeliveryType::Delivery, Decimal::new(9999, 2), &settings()),
            Decimal::TEN
        );
    }

    #[test]
    fn test_delivery_at_threshold_is_free() {
        assert_eq!(
            compute_delivery_fee(DeliveryType::Delivery, Decimal::ONE_HUNDRED, &settings()),
            Decimal::ZERO
        );
        assert_eq!(
            compute_delivery_fee(DeliveryType::Delivery, Decimal::new(250, 0), &settings()),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_default_settings() {
        let defaults = DeliverySettings::default();
        assert_eq!(defaults.base_fee.to_string(), "5.00");
        assert_eq!(defaults.free_threshold.to_string(), "50.00");
    }
}
