//! Pricing and promo-code validation failures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::MenuItemId;

/// Why an order could not be priced or a promo code could not be applied.
///
/// Every variant is a validation outcome shown to the customer, never a
/// transient failure, so none of them are worth retrying.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The order has no line items.
    #[error("Your order is empty")]
    EmptyOrder,

    /// A line item references a menu item that is missing or switched off.
    #[error("Menu item {0} is not available right now")]
    ItemUnavailable(MenuItemId),

    /// No promo code matches the entered text.
    #[error("Promo code not found")]
    CodeNotFound,

    /// The code exists but has been disabled.
    #[error("This promo code is not active")]
    CodeInactive,

    /// The code's start date is still ahead.
    #[error("This promo code is valid from {}", .starts_at.format("%Y-%m-%d"))]
    NotYetActive {
        /// When the code becomes usable.
        starts_at: DateTime<Utc>,
    },

    /// The code's end date has passed.
    #[error("This promo code expired on {}", .ends_at.format("%Y-%m-%d"))]
    Expired {
        /// When the code stopped being usable.
        ends_at: DateTime<Utc>,
    },

    /// Global redemptions have reached the configured limit.
    #[error("This promo code has reached its usage limit")]
    UsageLimitReached,

    /// Subtotal is under the code's minimum order amount.
    #[error("Minimum order amount for this promo code is {minimum:.2}")]
    BelowMinimum {
        /// Required subtotal.
        minimum: Decimal,
    },

    /// The signed-in customer has used the code as often as allowed.
    #[error("You have already used this promo code {limit} time(s)")]
    PerUserLimitReached {
        /// Allowed redemptions per customer.
        limit: i32,
    },
}

impl PricingError {
    /// Stable machine-readable name, used in API responses.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmptyOrder => "empty_order",
            Self::ItemUnavailable(_) => "item_unavailable",
            Self::CodeNotFound => "code_not_found",
            Self::CodeInactive => "code_inactive",
            Self::NotYetActive { .. } => "not_yet_active",
            Self::Expired { .. } => "expired",
            Self::UsageLimitReached => "usage_limit_reached",
            Self::BelowMinimum { .. } => "below_minimum",
            Self::PerUserLimitReached { .. } => "per_user_limit_reached",
        }
    }

    /// Whether the failure concerns the promo code rather than the cart.
    #[must_use]
    pub const fn is_promo_error(&self) -> bool {
        !matches!(self, Self::EmptyOrder | Self::ItemUnavailable(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_below_minimum_formats_two_decimals() {
        let err = PricingError::BelowMinimum {
            minimum: Decimal::new(30, 0),
        };
        assert_eq!(
            err.to_string(),
            "Minimum order amount for this promo code is 30.00"
        );

        let err = PricingError::BelowMinimum {
            minimum: Decimal::new(12_5, 1),
        };
        assert!(err.to_string().ends_with("12.50"));
    }

    #[test]
    fn test_date_messages() {
        let ends_at = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();
        let err = PricingError::Expired { ends_at };
        assert_eq!(err.to_string(), "This promo code expired on 2026-03-31");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let now = Utc::now();
        let all = [
            PricingError::EmptyOrder,
            PricingError::ItemUnavailable(MenuItemId::new(1)),
            PricingError::CodeNotFound,
            PricingError::CodeInactive,
            PricingError::NotYetActive { starts_at: now },
            PricingError::Expired { ends_at: now },
            PricingError::UsageLimitReached,
            PricingError::BelowMinimum {
                minimum: Decimal::ONE,
            },
            PricingError::PerUserLimitReached { limit: 1 },
        ];
        let mut kinds: Vec<_> = all.iter().map(PricingError::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), all.len());
    }

    #[test]
    fn test_promo_error_classification() {
        assert!(!PricingError::EmptyOrder.is_promo_error());
        assert!(!PricingError::ItemUnavailable(MenuItemId::new(2)).is_promo_error());
        assert!(PricingError::CodeNotFound.is_promo_error());
        assert!(PricingError::UsageLimitReached.is_promo_error());
    }
}
