//! Checkout entry points combining the individual pricing steps.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, LineItem, PricedLine, price_lines};
use super::delivery::{DeliverySettings, DeliveryType, compute_delivery_fee};
use super::promo::{
    Discount, DiscountKind, PromoCodeLookup, UsageLookup, compute_discount, validate_promo_code,
};
use super::PricingError;
use crate::types::{PromoCodeId, UserId};

/// Priced order.
///
/// `total` is always `max(0, subtotal + delivery_fee - discount)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    /// A free-delivery promo waived the delivery fee.
    pub free_delivery_applied: bool,
}

/// Order total after fees and discounts, never below zero.
#[must_use]
pub fn compute_total(subtotal: Decimal, delivery_fee: Decimal, discount: Decimal) -> Decimal {
    (subtotal + delivery_fee - discount).max(Decimal::ZERO)
}

/// The promo code part of a quote request.
#[derive(Debug, Clone, Copy)]
pub struct PromoRequest<'a> {
    /// Code as typed by the customer.
    pub code: &'a str,
    /// Signed-in customer, for per-user limits.
    pub user_id: Option<UserId>,
    /// Clock reading used for the date window.
    pub now: DateTime<Utc>,
}

/// A promo code that was accepted for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub promo_code_id: PromoCodeId,
    /// Code as stored, not as typed.
    pub code: String,
    pub kind: DiscountKind,
    pub amount: Decimal,
    pub free_delivery: bool,
}

/// Result of pricing an order with a promo code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoQuote {
    pub pricing: PricingResult,
    pub applied: AppliedDiscount,
}

/// Prices orders against a fixed set of delivery settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine {
    settings: DeliverySettings,
}

impl PricingEngine {
    /// Create an engine for the given delivery settings.
    #[must_use]
    pub const fn new(settings: DeliverySettings) -> Self {
        Self { settings }
    }

    /// Delivery settings in use.
    #[must_use]
    pub const fn settings(&self) -> &DeliverySettings {
        &self.settings
    }

    /// Price an order without a promo code.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::EmptyOrder`] or [`PricingError::ItemUnavailable`].
    pub fn price<C>(
        &self,
        items: &[LineItem],
        delivery: DeliveryType,
        catalog: &C,
    ) -> Result<PricingResult, PricingError>
    where
        C: Catalog + ?Sized,
    {
        let lines = price_lines(items, catalog)?;
        Ok(self.assemble(&lines, delivery, Discount::NONE))
    }

    /// Validate a promo code and price the order with it applied.
    ///
    /// Cart problems are reported before promo problems.
    ///
    /// # Errors
    ///
    /// Returns the first cart or promo validation failure.
    pub fn validate_and_price<C, P, U>(
        &self,
        request: &PromoRequest<'_>,
        items: &[LineItem],
        delivery: DeliveryType,
        catalog: &C,
        promos: &P,
        usage: &U,
    ) -> Result<PromoQuote, PricingError>
    where
        C: Catalog + ?Sized,
        P: PromoCodeLookup + ?Sized,
        U: UsageLookup + ?Sized,
    {
        let lines = price_lines(items, catalog)?;
        let subtotal = subtotal_of(&lines);

        let promo = validate_promo_code(
            request.code,
            subtotal,
            request.user_id,
            request.now,
            promos,
            usage,
        )?;
        let discount = compute_discount(promo, subtotal);
        let pricing = self.assemble(&lines, delivery, discount);

        Ok(PromoQuote {
            applied: AppliedDiscount {
                promo_code_id: promo.id,
                code: promo.code.clone(),
                kind: promo.kind,
                amount: discount.amount,
                free_delivery: pricing.free_delivery_applied,
            },
            pricing,
        })
    }

    fn assemble(
        &self,
        lines: &[PricedLine],
        delivery: DeliveryType,
        discount: Discount,
    ) -> PricingResult {
        let subtotal = subtotal_of(lines);
        let standard_fee = compute_delivery_fee(delivery, subtotal, &self.settings);
        let free_delivery_applied =
            discount.free_delivery && delivery == DeliveryType::Delivery;
        let delivery_fee = if free_delivery_applied {
            Decimal::ZERO
        } else {
            standard_fee
        };

        PricingResult {
            subtotal,
            delivery_fee,
            discount: discount.amount,
            total: compute_total(subtotal, delivery_fee, discount.amount),
            free_delivery_applied,
        }
    }
}

fn subtotal_of(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(|line| line.line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use chrono::TimeZone;

    use super::*;
    use crate::pricing::{CatalogItem, PromoCode};
    use crate::types::MenuItemId;

    fn engine() -> PricingEngine {
        PricingEngine::new(DeliverySettings {
            base_fee: Decimal::TEN,
            free_threshold: Decimal::ONE_HUNDRED,
        })
    }

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem {
                id: MenuItemId::new(1),
                name: "Lamb kofta".to_owned(),
                price: Decimal::new(20, 0),
                is_available: true,
            },
            CatalogItem {
                id: MenuItemId::new(2),
                name: "Mezze platter".to_owned(),
                price: Decimal::new(15, 0),
                is_available: true,
            },
        ]
    }

    fn line(id: i32, quantity: u32) -> LineItem {
        LineItem::new(MenuItemId::new(id), NonZeroU32::new(quantity).unwrap())
    }

    fn promo(kind: DiscountKind, value: i64) -> PromoCode {
        PromoCode {
            id: PromoCodeId::new(5),
            code: "WELCOME".to_owned(),
            kind,
            value: Decimal::new(value, 0),
            min_order_amount: None,
            max_discount: None,
            usage_limit: None,
            per_user_limit: None,
            starts_at: None,
            ends_at: None,
            is_active: true,
            usage_count: 0,
        }
    }

    fn request() -> PromoRequest<'static> {
        PromoRequest {
            code: "welcome",
            user_id: Some(UserId::new(1)),
            now: Utc.with_ymd_and_hms(2026, 1, 10, 18, 30, 0).unwrap(),
        }
    }

    fn unused(_: PromoCodeId, _: UserId) -> i64 {
        0
    }

    #[test]
    fn test_delivery_scenario() {
        let result = engine()
            .price(&[line(1, 2), line(2, 1)], DeliveryType::Delivery, &catalog())
            .unwrap();
        assert_eq!(result.subtotal, Decimal::new(55, 0));
        assert_eq!(result.delivery_fee, Decimal::TEN);
        assert_eq!(result.discount, Decimal::ZERO);
        assert_eq!(result.total, Decimal::new(65, 0));
        assert!(!result.free_delivery_applied);
    }

    #[test]
    fn test_pickup_scenario() {
        let result = engine()
            .price(&[line(1, 2), line(2, 1)], DeliveryType::Pickup, &catalog())
            .unwrap();
        assert_eq!(result.delivery_fee, Decimal::ZERO);
        assert_eq!(result.total, Decimal::new(55, 0));
    }

    #[test]
    fn test_total_never_negative() {
        assert_eq!(
            compute_total(Decimal::new(50, 0), Decimal::TEN, Decimal::new(200, 0)),
            Decimal::ZERO
        );
        assert_eq!(
            compute_total(Decimal::ZERO, Decimal::ZERO, Decimal::new(1, 2)),
            Decimal::ZERO
        );
        assert_eq!(
            compute_total(Decimal::new(50, 0), Decimal::TEN, Decimal::new(15, 0)),
            Decimal::new(45, 0)
        );
    }

    #[test]
    fn test_fixed_discount_exceeding_order_clamps_total() {
        // subtotal 50 (kofta x1 + mezze x2), fee 10
        let promos = vec![promo(DiscountKind::Fixed, 200)];
        let quote = engine()
            .validate_and_price(
                &request(),
                &[line(1, 1), line(2, 2)],
                DeliveryType::Delivery,
                &catalog(),
                &promos,
                &unused,
            )
            .unwrap();
        assert_eq!(quote.pricing.subtotal, Decimal::new(50, 0));
        assert_eq!(quote.pricing.delivery_fee, Decimal::TEN);
        assert_eq!(quote.pricing.discount, Decimal::new(200, 0));
        assert_eq!(quote.pricing.total, Decimal::ZERO);
        assert_eq!(quote.applied.code, "WELCOME");
    }

    #[test]
    fn test_capped_percentage_quote() {
        let mut p = promo(DiscountKind::Percentage, 50);
        p.max_discount = Some(Decimal::new(20, 0));
        let quote = engine()
            .validate_and_price(
                &request(),
                &[line(1, 5)],
                DeliveryType::Pickup,
                &catalog(),
                std::slice::from_ref(&p),
                &unused,
            )
            .unwrap();
        assert_eq!(quote.pricing.subtotal, Decimal::ONE_HUNDRED);
        assert_eq!(quote.applied.amount, Decimal::new(20, 0));
        assert_eq!(quote.pricing.total, Decimal::new(80, 0));
    }

    #[test]
    fn test_free_delivery_zeroes_fee() {
        let promos = vec![promo(DiscountKind::FreeDelivery, 0)];
        let quote = engine()
            .validate_and_price(
                &request(),
                &[line(1, 2), line(2, 1)],
                DeliveryType::Delivery,
                &catalog(),
                &promos,
                &unused,
            )
            .unwrap();
        assert_eq!(quote.pricing.delivery_fee, Decimal::ZERO);
        assert_eq!(quote.pricing.discount, Decimal::ZERO);
        assert_eq!(quote.pricing.total, Decimal::new(55, 0));
        assert!(quote.pricing.free_delivery_applied);
        assert!(quote.applied.free_delivery);
    }

    #[test]
    fn test_free_delivery_on_pickup_applies_nothing() {
        let promos = vec![promo(DiscountKind::FreeDelivery, 0)];
        let quote = engine()
            .validate_and_price(
                &request(),
                &[line(1, 1)],
                DeliveryType::Pickup,
                &catalog(),
                &promos,
                &unused,
            )
            .unwrap();
        assert!(!quote.pricing.free_delivery_applied);
        assert_eq!(quote.pricing.total, Decimal::new(20, 0));
    }

    #[test]
    fn test_cart_errors_precede_promo_errors() {
        let promos: Vec<PromoCode> = Vec::new();
        let result = engine().validate_and_price(
            &request(),
            &[],
            DeliveryType::Delivery,
            &catalog(),
            &promos,
            &unused,
        );
        assert_eq!(result, Err(PricingError::EmptyOrder));
    }

    #[test]
    fn test_minimum_checked_against_item_subtotal() {
        let mut p = promo(DiscountKind::Fixed, 5);
        p.min_order_amount = Some(Decimal::new(60, 0));
        // subtotal 55 + fee 10 = 65 total, but the minimum looks at the subtotal only
        let result = engine().validate_and_price(
            &request(),
            &[line(1, 2), line(2, 1)],
            DeliveryType::Delivery,
            &catalog(),
            std::slice::from_ref(&p),
            &unused,
        );
        assert_eq!(
            result,
            Err(PricingError::BelowMinimum {
                minimum: Decimal::new(60, 0)
            })
        );
    }

    #[test]
    fn test_pricing_result_serializes_amounts_as_strings() {
        let result = engine()
            .price(&[line(2, 1)], DeliveryType::Delivery, &catalog())
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["subtotal"], "15");
        assert_eq!(json["delivery_fee"], "10");
        assert_eq!(json["total"], "25");
    }
}
