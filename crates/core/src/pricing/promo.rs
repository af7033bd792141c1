//! Promo codes: definition, eligibility checks and discount amounts.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::PricingError;
use crate::types::{PromoCodeId, UserId};

/// What a promo code takes off the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.discount_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` percent of the subtotal, optionally capped.
    Percentage,
    /// A flat `value` off.
    Fixed,
    /// Waives the delivery fee. `value` is ignored.
    FreeDelivery,
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage => write!(f, "percentage"),
            Self::Fixed => write!(f, "fixed"),
            Self::FreeDelivery => write!(f, "free_delivery"),
        }
    }
}

impl std::str::FromStr for DiscountKind {
    type Err = PromoDefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            "free_delivery" => Ok(Self::FreeDelivery),
            _ => Err(PromoDefinitionError::UnknownKind(s.to_owned())),
        }
    }
}

/// A stored promo code.
///
/// Counters are `i32` because they mirror Postgres `INTEGER` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct PromoCode {
    pub id: PromoCodeId,
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub per_user_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub usage_count: i32,
}

impl PromoCode {
    /// Case-insensitive match against customer input.
    #[must_use]
    pub fn matches_code(&self, input: &str) -> bool {
        self.code.eq_ignore_ascii_case(input.trim())
    }
}

/// Find a promo code by the text a customer typed.
pub trait PromoCodeLookup {
    /// Look up a code, ignoring case and surrounding whitespace.
    fn find_code(&self, code: &str) -> Option<&PromoCode>;
}

impl PromoCodeLookup for [PromoCode] {
    fn find_code(&self, code: &str) -> Option<&PromoCode> {
        self.iter().find(|promo| promo.matches_code(code))
    }
}

impl PromoCodeLookup for Vec<PromoCode> {
    fn find_code(&self, code: &str) -> Option<&PromoCode> {
        self.as_slice().find_code(code)
    }
}

/// The single record a storage query returned for this code, if any.
impl PromoCodeLookup for Option<PromoCode> {
    fn find_code(&self, code: &str) -> Option<&PromoCode> {
        self.as_ref().filter(|promo| promo.matches_code(code))
    }
}

/// How many times a customer has already redeemed a code.
pub trait UsageLookup {
    /// Successful prior redemptions of `promo` by `user`.
    fn prior_uses(&self, promo: PromoCodeId, user: UserId) -> i64;
}

impl<F> UsageLookup for F
where
    F: Fn(PromoCodeId, UserId) -> i64,
{
    fn prior_uses(&self, promo: PromoCodeId, user: UserId) -> i64 {
        self(promo, user)
    }
}

/// Run the eligibility checks for a promo code.
///
/// Checks stop at the first failure, in this order: existence, active flag,
/// start date, end date, global usage limit, minimum order amount, per-user
/// limit. Customers therefore see an expired code reported as expired even
/// when their cart is also below the minimum.
///
/// The per-user limit only applies when `user` is signed in.
///
/// # Errors
///
/// Returns the [`PricingError`] for the first failed check.
pub fn validate_promo_code<'a, P, U>(
    code: &str,
    subtotal: Decimal,
    user: Option<UserId>,
    now: DateTime<Utc>,
    promos: &'a P,
    usage: &U,
) -> Result<&'a PromoCode, PricingError>
where
    P: PromoCodeLookup + ?Sized,
    U: UsageLookup + ?Sized,
{
    let promo = promos.find_code(code).ok_or(PricingError::CodeNotFound)?;

    if !promo.is_active {
        return Err(PricingError::CodeInactive);
    }

    if let Some(starts_at) = promo.starts_at
        && now < starts_at
    {
        return Err(PricingError::NotYetActive { starts_at });
    }

    if let Some(ends_at) = promo.ends_at
        && now > ends_at
    {
        return Err(PricingError::Expired { ends_at });
    }

    if let Some(limit) = promo.usage_limit
        && promo.usage_count >= limit
    {
        return Err(PricingError::UsageLimitReached);
    }

    if let Some(minimum) = promo.min_order_amount
        && subtotal < minimum
    {
        return Err(PricingError::BelowMinimum { minimum });
    }

    if let (Some(limit), Some(user)) = (promo.per_user_limit, user)
        && usage.prior_uses(promo.id, user) >= i64::from(limit)
    {
        return Err(PricingError::PerUserLimitReached { limit });
    }

    Ok(promo)
}

/// Discount granted by a valid promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Amount taken off the item subtotal.
    pub amount: Decimal,
    /// The delivery fee is waived.
    pub free_delivery: bool,
}

impl Discount {
    /// No discount at all.
    pub const NONE: Self = Self {
        amount: Decimal::ZERO,
        free_delivery: false,
    };
}

/// Discount a promo code grants on the given subtotal.
///
/// Percentage discounts are rounded to cents (half away from zero) before the
/// cap is applied. Fixed discounts are deliberately not limited to the
/// subtotal; the order total is clamped at zero instead.
#[must_use]
pub fn compute_discount(promo: &PromoCode, subtotal: Decimal) -> Discount {
    match promo.kind {
        DiscountKind::Percentage => {
            let raw = (subtotal * promo.value / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let capped = promo.max_discount.map_or(raw, |cap| raw.min(cap));
            Discount {
                amount: capped.max(Decimal::ZERO),
                free_delivery: false,
            }
        }
        DiscountKind::Fixed => Discount {
            amount: promo.value.max(Decimal::ZERO),
            free_delivery: false,
        },
        DiscountKind::FreeDelivery => Discount {
            amount: Decimal::ZERO,
            free_delivery: true,
        },
    }
}

/// Invalid promo code definition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PromoDefinitionError {
    #[error("code must be {min}-{max} characters of letters, digits, '-' or '_'", min = NewPromoCode::MIN_CODE_LENGTH, max = NewPromoCode::MAX_CODE_LENGTH)]
    InvalidCode,
    #[error("unknown discount kind: {0} (expected percentage, fixed or free_delivery)")]
    UnknownKind(String),
    #[error("discount value must be greater than zero")]
    NonPositiveValue,
    #[error("percentage discount cannot exceed 100")]
    PercentageTooLarge,
    #[error("max discount only applies to percentage codes")]
    CapWithoutPercentage,
    #[error("{0} must be greater than zero")]
    NonPositiveAmount(&'static str),
    #[error("{0} must be at least 1")]
    NonPositiveLimit(&'static str),
    #[error("start date must be before end date")]
    InvalidWindow,
}

/// A promo code as entered by an administrator, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPromoCode {
    pub code: String,
    pub kind: DiscountKind,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub per_user_limit: Option<i32>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl NewPromoCode {
    /// Shortest accepted code.
    pub const MIN_CODE_LENGTH: usize = 3;
    /// Longest accepted code.
    pub const MAX_CODE_LENGTH: usize = 32;

    /// Uppercased, trimmed code as it will be stored.
    #[must_use]
    pub fn normalized_code(&self) -> String {
        self.code.trim().to_ascii_uppercase()
    }

    /// Check the definition before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), PromoDefinitionError> {
        let code = self.code.trim();
        if !(Self::MIN_CODE_LENGTH..=Self::MAX_CODE_LENGTH).contains(&code.len())
            || !code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(PromoDefinitionError::InvalidCode);
        }

        match self.kind {
            DiscountKind::Percentage | DiscountKind::Fixed if self.value <= Decimal::ZERO => {
                return Err(PromoDefinitionError::NonPositiveValue);
            }
            DiscountKind::Percentage if self.value > Decimal::ONE_HUNDRED => {
                return Err(PromoDefinitionError::PercentageTooLarge);
            }
            _ => {}
        }

        if let Some(cap) = self.max_discount {
            if self.kind != DiscountKind::Percentage {
                return Err(PromoDefinitionError::CapWithoutPercentage);
            }
            if cap <= Decimal::ZERO {
                return Err(PromoDefinitionError::NonPositiveAmount("max discount"));
            }
        }

        if self.min_order_amount.is_some_and(|min| min <= Decimal::ZERO) {
            return Err(PromoDefinitionError::NonPositiveAmount("minimum order amount"));
        }
        if self.usage_limit.is_some_and(|limit| limit < 1) {
            return Err(PromoDefinitionError::NonPositiveLimit("usage limit"));
        }
        if self.per_user_limit.is_some_and(|limit| limit < 1) {
            return Err(PromoDefinitionError::NonPositiveLimit("per-user limit"));
        }

        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at)
            && start >= end
        {
            return Err(PromoDefinitionError::InvalidWindow);
        }

        Ok(())
    }
}
