//! Menu and branch rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use saffron_core::{BranchId, MenuItemId};

/// A menu entry as shown to customers.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub category: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_available: bool,
    pub updated_at: DateTime<Utc>,
}

/// A restaurant location.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub is_active: bool,
}
