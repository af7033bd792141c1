//! Placed orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use saffron_core::{
    BranchId, DeliveryType, MenuItemId, OrderId, OrderStatus, PromoCodeId, UserId,
};

/// An order header row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    /// Customer-facing order number.
    pub reference: Uuid,
    pub user_id: Option<UserId>,
    pub branch_id: BranchId,
    pub delivery_type: DeliveryType,
    pub status: OrderStatus,
    pub customer_name: String,
    pub phone: String,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub promo_code_id: Option<PromoCodeId>,
    pub created_at: DateTime<Utc>,
}

/// A line of a placed order, with the price it was sold at.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub note: Option<String>,
    pub line_total: Decimal,
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Who the order is for and where it goes.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactDetails {
    pub customer_name: String,
    pub phone: String,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ContactDetails {
    /// Longest accepted free-text field.
    pub const MAX_FIELD_LENGTH: usize = 500;

    /// Check the contact fields for the chosen delivery type.
    ///
    /// # Errors
    ///
    /// Returns a customer-facing message describing the first problem.
    pub fn validate(&self, delivery: DeliveryType) -> Result<(), String> {
        if self.customer_name.trim().is_empty() {
            return Err("Name is required".to_string());
        }

        let digits = self.phone.chars().filter(char::is_ascii_digit).count();
        if !(7..=15).contains(&digits) {
            return Err("Phone number must contain 7 to 15 digits".to_string());
        }

        let address_given = self
            .delivery_address
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty());
        if delivery == DeliveryType::Delivery && !address_given {
            return Err("Delivery address is required for delivery orders".to_string());
        }

        let too_long = [
            Some(self.customer_name.as_str()),
            self.delivery_address.as_deref(),
            self.notes.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.len() > Self::MAX_FIELD_LENGTH);
        if too_long {
            return Err(format!(
                "Fields must be at most {} characters",
                Self::MAX_FIELD_LENGTH
            ));
        }

        Ok(())
    }

    /// Delivery address to store; pickup orders never keep one.
    #[must_use]
    pub fn address_for(&self, delivery: DeliveryType) -> Option<String> {
        match delivery {
            DeliveryType::Pickup => None,
            DeliveryType::Delivery => self
                .delivery_address
                .as_deref()
                .map(str::trim)
                .map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            customer_name: "Leyla Demir".to_owned(),
            phone: "+44 20 7946 0958".to_owned(),
            delivery_address: None,
            notes: None,
        }
    }

    #[test]
    fn test_pickup_needs_no_address() {
        assert_eq!(contact().validate(DeliveryType::Pickup), Ok(()));
    }

    #[test]
    fn test_delivery_requires_address() {
        let mut details = contact();
        assert!(details.validate(DeliveryType::Delivery).is_err());
        details.delivery_address = Some("   ".to_owned());
        assert!(details.validate(DeliveryType::Delivery).is_err());
        details.delivery_address = Some("12 Mill Lane".to_owned());
        assert_eq!(details.validate(DeliveryType::Delivery), Ok(()));
    }

    #[test]
    fn test_phone_digits() {
        let mut details = contact();
        details.phone = "12-34".to_owned();
        assert_eq!(
            details.validate(DeliveryType::Pickup),
            Err("Phone number must contain 7 to 15 digits".to_string())
        );
    }

    #[test]
    fn test_blank_name() {
        let mut details = contact();
        details.customer_name = " ".to_owned();
        assert!(details.validate(DeliveryType::Pickup).is_err());
    }

    #[test]
    fn test_address_dropped_for_pickup() {
        let mut details = contact();
        details.delivery_address = Some(" 12 Mill Lane ".to_owned());
        assert_eq!(details.address_for(DeliveryType::Pickup), None);
        assert_eq!(
            details.address_for(DeliveryType::Delivery).as_deref(),
            Some("12 Mill Lane")
        );
    }
}
