//! Promo code management commands.
//!
//! # Usage
//!
//! ```bash
//! saffron promo create --code WELCOME10 --kind percentage --value 10 --max-discount 15
//! saffron promo create --code FREESHIP --kind free_delivery --min-order 25
//! saffron promo list
//! saffron promo disable WELCOME10
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use saffron_core::{DiscountKind, NewPromoCode, PromoCode};
use saffron_storefront::db::{PromoCodeRepository, RepositoryError};

use super::{CommandError, connect};

/// Validate and store a promo code.
///
/// # Errors
///
/// Returns `CommandError::InvalidPromo` before touching the database if the
/// definition is invalid, or a database error if the insert fails.
pub async fn create(new: NewPromoCode) -> Result<(), CommandError> {
    new.validate()?;

    let pool = connect().await?;
    let promo = PromoCodeRepository::new(&pool).create(&new).await?;

    tracing::info!(promo_code_id = %promo.id, "Created promo code {}", promo.code);
    Ok(())
}

/// Print every promo code.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let promos = PromoCodeRepository::new(&pool).list().await?;

    #[allow(clippy::print_stdout)]
    {
        if promos.is_empty() {
            println!("No promo codes");
        }
        for promo in &promos {
            println!("{}", summary(promo));
        }
    }
    Ok(())
}

/// Enable or disable a promo code by its text.
///
/// # Errors
///
/// Returns `CommandError::PromoNotFound` if no code matches.
pub async fn set_active(code: &str, is_active: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let promo = PromoCodeRepository::new(&pool)
        .set_active_by_code(code, is_active)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::PromoNotFound(code.to_owned()),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(
        "Promo code {} {}",
        promo.code,
        if promo.is_active { "enabled" } else { "disabled" }
    );
    Ok(())
}

/// Build a definition from command-line arguments.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn definition(
    code: String,
    kind: DiscountKind,
    value: Decimal,
    min_order_amount: Option<Decimal>,
    max_discount: Option<Decimal>,
    usage_limit: Option<i32>,
    per_user_limit: Option<i32>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> NewPromoCode {
    NewPromoCode {
        code,
        kind,
        value,
        min_order_amount,
        max_discount,
        usage_limit,
        per_user_limit,
        starts_at,
        ends_at,
    }
}

/// One-line description of a promo code.
fn summary(promo: &PromoCode) -> String {
    let discount = match promo.kind {
        DiscountKind::Percentage => match promo.max_discount {
            Some(cap) => format!("{}% off (max {cap:.2})", promo.value.normalize()),
            None => format!("{}% off", promo.value.normalize()),
        },
        DiscountKind::Fixed => format!("{:.2} off", promo.value),
        DiscountKind::FreeDelivery => "free delivery".to_string(),
    };

    let usage = match promo.usage_limit {
        Some(limit) => format!("{}/{limit} used", promo.usage_count),
        None => format!("{} used", promo.usage_count),
    };

    let mut line = format!("{:<12} {discount}, {usage}", promo.code);
    if let Some(minimum) = promo.min_order_amount {
        line.push_str(&format!(", min order {minimum:.2}"));
    }
    if let Some(limit) = promo.per_user_limit {
        line.push_str(&format!(", {limit} per customer"));
    }
    if !promo.is_active {
        line.push_str(" [inactive]");
    }
    line
}

#[cfg(test)]
mod tests {
    use saffron_core::PromoCodeId;

    use super::*;

    fn promo(kind: DiscountKind, value: Decimal) -> PromoCode {
        PromoCode {
            id: PromoCodeId::new(1),
            code: "WELCOME10".to_owned(),
            kind,
            value,
            min_order_amount: None,
            max_discount: None,
            usage_limit: None,
            per_user_limit: None,
            starts_at: None,
            ends_at: None,
            is_active: true,
            usage_count: 3,
        }
    }

    #[test]
    fn test_summary_percentage_with_cap() {
        let mut p = promo(DiscountKind::Percentage, Decimal::new(1000, 2));
        p.max_discount = Some(Decimal::new(15, 0));
        p.usage_limit = Some(100);
        assert_eq!(
            summary(&p),
            "WELCOME10    10% off (max 15.00), 3/100 used"
        );
    }

    #[test]
    fn test_summary_inactive_free_delivery() {
        let mut p = promo(DiscountKind::FreeDelivery, Decimal::ZERO);
        p.code = "FREESHIP".to_owned();
        p.min_order_amount = Some(Decimal::new(25, 0));
        p.per_user_limit = Some(1);
        p.is_active = false;
        assert_eq!(
            summary(&p),
            "FREESHIP     free delivery, 3 used, min order 25.00, 1 per customer [inactive]"
        );
    }

    #[test]
    fn test_definition_rejected_before_connecting() {
        let new = definition(
            "X".to_owned(),
            DiscountKind::Fixed,
            Decimal::new(5, 0),
            None,
            None,
            None,
            None,
            None,
            None,
        );
        assert!(new.validate().is_err());
    }
}
