//! Checkout service.
//!
//! Loads current prices, delivery settings and promo codes from the
//! database, hands them to the pricing engine and persists placed orders.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use saffron_core::pricing::price_lines;
use saffron_core::{
    BranchId, CatalogItem, DeliveryType, LineItem, PricedLine, PricingEngine, PricingError,
    PricingResult, PromoCode, PromoCodeId, PromoQuote, PromoRequest, UserId,
};

use crate::config::StorefrontConfig;
use crate::db::orders::{self, NewOrder};
use crate::db::promo_codes::{self, PromoCodeRepository};
use crate::db::{BranchRepository, MenuRepository, RepositoryError, settings};
use crate::models::{ContactDetails, OrderWithItems};

/// Most units of one menu item a single line may carry.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Largest amount the order columns can hold (`NUMERIC(10,2)`).
// 9_999_999_999 split into 32-bit words (`Decimal::new` is not const).
pub const MAX_ORDER_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart or promo code was rejected.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Contact details are incomplete or malformed.
    #[error("{0}")]
    InvalidContact(String),

    /// The branch does not exist or is not taking orders.
    #[error("Branch {0} is not accepting orders")]
    BranchUnavailable(BranchId),

    /// A line quantity or an amount is beyond what can be ordered.
    #[error("{0}")]
    OrderTooLarge(String),

    /// Database operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// A customer's order submission.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub branch_id: BranchId,
    pub delivery_type: DeliveryType,
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub contact: ContactDetails,
    #[serde(default)]
    pub promo_code: Option<String>,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    config: &'a StorefrontConfig,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, config: &'a StorefrontConfig) -> Self {
        Self { pool, config }
    }

    /// Pricing engine using the stored delivery settings, or the configured
    /// defaults when none are stored.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the settings cannot be read.
    pub async fn engine(&self) -> Result<PricingEngine, CheckoutError> {
        let settings = settings::get_delivery_settings(self.pool)
            .await?
            .unwrap_or(self.config.default_delivery);
        Ok(PricingEngine::new(settings))
    }

    /// Price a cart without a promo code.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Pricing` for an empty cart or unavailable items,
    /// `CheckoutError::OrderTooLarge` when a quantity or amount is too large.
    pub async fn quote(
        &self,
        items: &[LineItem],
        delivery: DeliveryType,
    ) -> Result<PricingResult, CheckoutError> {
        check_quantities(items)?;
        let catalog = MenuRepository::new(self.pool).catalog_for(items).await?;
        let engine = self.engine().await?;
        let pricing = engine.price(items, delivery, &catalog)?;
        check_amounts(&price_lines(items, &catalog)?, &pricing)?;
        Ok(pricing)
    }

    /// Validate a promo code and price the cart with it.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Pricing` with the first cart or promo failure,
    /// `CheckoutError::OrderTooLarge` when a quantity or amount is too large.
    pub async fn quote_with_promo(
        &self,
        code: &str,
        items: &[LineItem],
        delivery: DeliveryType,
        user_id: Option<UserId>,
    ) -> Result<PromoQuote, CheckoutError> {
        check_quantities(items)?;
        let catalog = MenuRepository::new(self.pool).catalog_for(items).await?;
        let engine = self.engine().await?;
        let quote = self
            .apply_promo(&engine, code, items, delivery, &catalog, user_id)
            .await?;
        check_amounts(&price_lines(items, &catalog)?, &quote.pricing)?;
        Ok(quote)
    }

    /// Price, validate and store an order in one transaction.
    ///
    /// A promo code's global counter is taken inside the transaction; if a
    /// concurrent checkout used the last redemption, nothing is stored and
    /// `UsageLimitReached` is returned.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidContact`, `CheckoutError::OrderTooLarge`,
    /// `CheckoutError::BranchUnavailable`, `CheckoutError::Pricing` or
    /// `CheckoutError::Repository`.
    pub async fn place_order(
        &self,
        request: OrderRequest,
        user_id: Option<UserId>,
    ) -> Result<OrderWithItems, CheckoutError> {
        request
            .contact
            .validate(request.delivery_type)
            .map_err(CheckoutError::InvalidContact)?;
        check_quantities(&request.items)?;

        let branch_open = BranchRepository::new(self.pool)
            .get(request.branch_id)
            .await?
            .is_some_and(|branch| branch.is_active);
        if !branch_open {
            return Err(CheckoutError::BranchUnavailable(request.branch_id));
        }

        let catalog = MenuRepository::new(self.pool)
            .catalog_for(&request.items)
            .await?;
        let engine = self.engine().await?;
        let lines = price_lines(&request.items, &catalog)?;

        let (pricing, applied) = match requested_code(request.promo_code.as_deref()) {
            Some(code) => {
                let quote = self
                    .apply_promo(
                        &engine,
                        code,
                        &request.items,
                        request.delivery_type,
                        &catalog,
                        user_id,
                    )
                    .await?;
                (quote.pricing, Some(quote.applied))
            }
            None => (
                engine.price(&request.items, request.delivery_type, &catalog)?,
                None,
            ),
        };
        check_amounts(&lines, &pricing)?;

        let mut tx = self.pool.begin().await?;

        if let Some(applied) = &applied
            && !promo_codes::consume(&mut *tx, applied.promo_code_id).await?
        {
            return Err(PricingError::UsageLimitReached.into());
        }

        let order = orders::insert_order(
            &mut *tx,
            &NewOrder {
                reference: Uuid::new_v4(),
                user_id,
                branch_id: request.branch_id,
                delivery_type: request.delivery_type,
                customer_name: request.contact.customer_name.clone(),
                phone: request.contact.phone.clone(),
                delivery_address: request.contact.address_for(request.delivery_type),
                notes: non_blank(request.contact.notes.as_deref()),
                pricing,
                promo_code_id: applied.as_ref().map(|a| a.promo_code_id),
            },
        )
        .await?;

        let items = orders::insert_items(&mut *tx, order.id, &lines).await?;

        if let Some(applied) = &applied {
            promo_codes::record_usage(&mut *tx, applied.promo_code_id, user_id, order.id).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            reference = %order.reference,
            branch_id = %order.branch_id,
            total = %order.total,
            promo_code = applied.as_ref().map(|a| a.code.as_str()),
            "Order placed"
        );

        Ok(OrderWithItems { order, items })
    }

    async fn apply_promo(
        &self,
        engine: &PricingEngine,
        code: &str,
        items: &[LineItem],
        delivery: DeliveryType,
        catalog: &[CatalogItem],
        user_id: Option<UserId>,
    ) -> Result<PromoQuote, CheckoutError> {
        let promos = PromoCodeRepository::new(self.pool);
        let promo = promos.find_by_code(code).await?;
        let prior = prior_uses(&promos, promo.as_ref(), user_id).await?;

        let request = PromoRequest {
            code,
            user_id,
            now: Utc::now(),
        };
        let usage = move |_: PromoCodeId, _: UserId| prior;

        Ok(engine.validate_and_price(&request, items, delivery, catalog, &promo, &usage)?)
    }
}

/// Redemptions by this account, fetched only when a per-user limit applies.
async fn prior_uses(
    promos: &PromoCodeRepository<'_>,
    promo: Option<&PromoCode>,
    user_id: Option<UserId>,
) -> Result<i64, CheckoutError> {
    match (promo, user_id) {
        (Some(promo), Some(user_id)) if promo.per_user_limit.is_some() => {
            Ok(promos.count_user_usages(promo.id, user_id).await?)
        }
        _ => Ok(0),
    }
}

/// Reject lines with more units than a kitchen will take in one order.
fn check_quantities(items: &[LineItem]) -> Result<(), CheckoutError> {
    items
        .iter()
        .find(|line| line.quantity.get() > MAX_LINE_QUANTITY)
        .map_or(Ok(()), |line| {
            Err(CheckoutError::OrderTooLarge(format!(
                "Quantity for item {} exceeds the maximum of {MAX_LINE_QUANTITY}",
                line.item_id
            )))
        })
}

/// Reject orders whose line totals or amounts would not fit the order columns.
fn check_amounts(lines: &[PricedLine], pricing: &PricingResult) -> Result<(), CheckoutError> {
    let amounts = lines.iter().map(|line| line.line_total).chain([
        pricing.subtotal,
        pricing.delivery_fee,
        pricing.discount,
        pricing.total,
    ]);

    for amount in amounts {
        if amount > MAX_ORDER_AMOUNT {
            return Err(CheckoutError::OrderTooLarge(format!(
                "Order amount {amount:.2} exceeds the maximum of {MAX_ORDER_AMOUNT}"
            )));
        }
    }
    Ok(())
}

/// A submitted promo code, or `None` when the field was left blank.
fn requested_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    requested_code(value).map(str::to_owned)
}
