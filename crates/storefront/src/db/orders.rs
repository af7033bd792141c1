//! Order repository.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use saffron_core::{
    BranchId, DeliveryType, OrderId, PricedLine, PricingResult, PromoCodeId, UserId,
};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderWithItems};

const ORDER_COLUMNS: &str = r"
    id, reference, user_id, branch_id, delivery_type, status,
    customer_name, phone, delivery_address, notes,
    subtotal, delivery_fee, discount, total, promo_code_id, created_at
";

/// Everything needed to insert an order header.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub reference: Uuid,
    pub user_id: Option<UserId>,
    pub branch_id: BranchId,
    pub delivery_type: DeliveryType,
    pub customer_name: String,
    pub phone: String,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub pricing: PricingResult,
    pub promo_code_id: Option<PromoCodeId>,
}

/// Insert an order header.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    new: &NewOrder,
) -> Result<Order, RepositoryError> {
    let query = format!(
        r"
        INSERT INTO storefront.customer_order (
            reference, user_id, branch_id, delivery_type,
            customer_name, phone, delivery_address, notes,
            subtotal, delivery_fee, discount, total, promo_code_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {ORDER_COLUMNS}
        "
    );

    let order = sqlx::query_as::<_, Order>(&query)
        .bind(new.reference)
        .bind(new.user_id)
        .bind(new.branch_id)
        .bind(new.delivery_type)
        .bind(new.customer_name.trim())
        .bind(new.phone.trim())
        .bind(new.delivery_address.as_deref())
        .bind(new.notes.as_deref())
        .bind(new.pricing.subtotal)
        .bind(new.pricing.delivery_fee)
        .bind(new.pricing.discount)
        .bind(new.pricing.total)
        .bind(new.promo_code_id)
        .fetch_one(conn)
        .await?;

    Ok(order)
}

/// Insert the priced lines of an order.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if a quantity does not fit the
/// column. Returns `RepositoryError::Database` if an insert fails.
pub async fn insert_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    lines: &[PricedLine],
) -> Result<Vec<OrderItem>, RepositoryError> {
    let mut items = Vec::with_capacity(lines.len());

    for line in lines {
        let quantity = i32::try_from(line.quantity.get()).map_err(|_| {
            RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
        })?;

        let item = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO storefront.order_item (
                order_id, menu_item_id, name, unit_price, quantity, note, line_total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING order_id, menu_item_id, name, unit_price, quantity, note, line_total
            ",
        )
        .bind(order_id)
        .bind(line.item_id)
        .bind(&line.name)
        .bind(line.unit_price)
        .bind(quantity)
        .bind(line.note.as_deref())
        .bind(line.line_total)
        .fetch_one(&mut *conn)
        .await?;

        items.push(item);
    }

    Ok(items)
}

/// Repository for reading orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// An account's orders with their lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let query = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM storefront.customer_order
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "
        );
        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT order_id, menu_item_id, name, unit_price, quantity, note, line_total
            FROM storefront.order_item
            WHERE order_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(attach_items(orders, items))
    }
}

/// Group item rows under their orders, keeping order sequence.
fn attach_items(orders: Vec<Order>, items: Vec<OrderItem>) -> Vec<OrderWithItems> {
    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    orders
        .into_iter()
        .map(|order| OrderWithItems {
            items: by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use saffron_core::{MenuItemId, OrderStatus};

    use super::*;

    fn order(id: i32) -> Order {
        Order {
            id: OrderId::new(id),
            reference: Uuid::new_v4(),
            user_id: Some(UserId::new(1)),
            branch_id: BranchId::new(1),
            delivery_type: DeliveryType::Pickup,
            status: OrderStatus::Pending,
            customer_name: "Sam".to_owned(),
            phone: "5551234567".to_owned(),
            delivery_address: None,
            notes: None,
            subtotal: Decimal::TEN,
            delivery_fee: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::TEN,
            promo_code_id: None,
            created_at: Utc::now(),
        }
    }

    fn item(order_id: i32, menu_item_id: i32) -> OrderItem {
        OrderItem {
            order_id: OrderId::new(order_id),
            menu_item_id: MenuItemId::new(menu_item_id),
            name: format!("dish-{menu_item_id}"),
            unit_price: Decimal::new(5, 0),
            quantity: 2,
            note: None,
            line_total: Decimal::TEN,
        }
    }

    #[test]
    fn test_attach_items_groups_by_order() {
        let grouped = attach_items(
            vec![order(2), order(1), order(3)],
            vec![item(1, 10), item(2, 11), item(1, 12)],
        );

        let summary: Vec<(i32, Vec<i32>)> = grouped
            .iter()
            .map(|o| {
                (
                    o.order.id.as_i32(),
                    o.items.iter().map(|i| i.menu_item_id.as_i32()).collect(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![(2, vec![11]), (1, vec![10, 12]), (3, vec![])]
        );
    }
}
