//! Integration tests for Saffron.
//!
//! These run checkout against a real `PostgreSQL` database so promo
//! redemption, per-customer limits and order writes are exercised together.
//!
//! # Running Tests
//!
//! ```bash
//! createdb saffron_test
//! TEST_DATABASE_URL=postgres://saffron@localhost:5432/saffron_test \
//!     cargo test -p saffron-integration-tests -- --ignored
//! ```
//!
//! Migrations are applied on connect. Every test creates its own branch,
//! menu item and promo code, so tests share a database without interfering.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use saffron_core::{
    BranchId, DeliverySettings, DeliveryType, DiscountKind, LineItem, MenuItemId, NewPromoCode,
    OrderId, PromoCode, PromoCodeId, UserId,
};
use saffron_storefront::config::StorefrontConfig;
use saffron_storefront::db::PromoCodeRepository;
use saffron_storefront::models::ContactDetails;
use saffron_storefront::services::{CheckoutService, OrderRequest};

/// Database used when `TEST_DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "postgres://saffron@localhost:5432/saffron_test";

/// Connected pool plus the configuration checkout needs.
pub struct TestContext {
    pub pool: PgPool,
    pub config: StorefrontConfig,
}

impl TestContext {
    /// Test helper: connect to the test database and apply migrations.
    pub async fn new() -> Self {
        let url =
            std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../storefront/migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let config = StorefrontConfig {
            database_url: SecretString::from(url),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            default_delivery: DeliverySettings::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        Self { pool, config }
    }

    /// Checkout service over the test database.
    #[must_use]
    pub const fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(&self.pool, &self.config)
    }

    /// Promo repository over the test database.
    #[must_use]
    pub const fn promo_codes(&self) -> PromoCodeRepository<'_> {
        PromoCodeRepository::new(&self.pool)
    }

    /// Test helper: insert an open branch.
    pub async fn create_branch(&self) -> BranchId {
        let (id,): (BranchId,) = sqlx::query_as(
            r"
            INSERT INTO storefront.branch (name, address)
            VALUES ($1, '1 Test Street')
            RETURNING id
            ",
        )
        .bind(format!("Branch {}", Uuid::new_v4()))
        .fetch_one(&self.pool)
        .await
        .expect("Failed to create branch");
        id
    }

    /// Test helper: insert an available menu item at `price`.
    pub async fn create_menu_item(&self, price: Decimal) -> MenuItemId {
        let (id,): (MenuItemId,) = sqlx::query_as(
            r"
            INSERT INTO storefront.menu_item (category, name, price)
            VALUES ('mains', 'Lamb biryani', $1)
            RETURNING id
            ",
        )
        .bind(price)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to create menu item");
        id
    }

    /// Test helper: store a promo code under a fresh, unique code.
    pub async fn create_promo(&self, mut new: NewPromoCode) -> PromoCode {
        new.code = unique_code();
        self.promo_codes()
            .create(&new)
            .await
            .expect("Failed to create promo code")
    }

    /// Test helper: number of orders stored for a branch.
    pub async fn order_count(&self, branch_id: BranchId) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM storefront.customer_order WHERE branch_id = $1")
                .bind(branch_id)
                .fetch_one(&self.pool)
                .await
                .expect("Failed to count orders");
        count
    }

    /// Test helper: the stored global redemption counter for a code.
    pub async fn usage_count(&self, promo_code_id: PromoCodeId) -> i32 {
        let (count,): (i32,) =
            sqlx::query_as("SELECT usage_count FROM storefront.promo_code WHERE id = $1")
                .bind(promo_code_id)
                .fetch_one(&self.pool)
                .await
                .expect("Failed to read usage count");
        count
    }

    /// Test helper: mark an order as cancelled.
    pub async fn cancel_order(&self, order_id: OrderId) {
        sqlx::query("UPDATE storefront.customer_order SET status = 'cancelled' WHERE id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await
            .expect("Failed to cancel order");
    }
}

/// Test helper: a code no other test uses.
#[must_use]
pub fn unique_code() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("IT{}", suffix.get(..12).unwrap_or(&suffix))
}

/// Test helper: a promo definition with every optional rule left off.
#[must_use]
pub fn promo(kind: DiscountKind, value: Decimal) -> NewPromoCode {
    NewPromoCode {
        code: String::new(),
        kind,
        value,
        min_order_amount: None,
        max_discount: None,
        usage_limit: None,
        per_user_limit: None,
        starts_at: None,
        ends_at: None,
    }
}

/// Test helper: a pickup order for `quantity` of one item.
#[must_use]
pub fn pickup_order(
    branch_id: BranchId,
    item_id: MenuItemId,
    quantity: u32,
    promo_code: Option<&str>,
) -> OrderRequest {
    let quantity = NonZeroU32::new(quantity).expect("quantity must be non-zero");
    OrderRequest {
        branch_id,
        delivery_type: DeliveryType::Pickup,
        items: vec![LineItem::new(item_id, quantity)],
        contact: ContactDetails {
            customer_name: "Farah Haddad".to_owned(),
            phone: "0161 496 0000".to_owned(),
            delivery_address: None,
            notes: None,
        },
        promo_code: promo_code.map(str::to_owned),
    }
}

/// Test helper: a customer id no other test uses.
#[must_use]
pub fn fresh_user() -> UserId {
    let raw = Uuid::new_v4().as_u128() % 1_000_000_000;
    UserId::new(i32::try_from(raw).unwrap_or(1) + 1)
}
