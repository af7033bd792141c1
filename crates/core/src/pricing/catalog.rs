//! Line items and the catalog they are priced against.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PricingError;
use crate::types::MenuItemId;

/// One menu item and the quantity requested in a cart.
///
/// Clients never send a price. Any `price` field in an incoming payload is
/// ignored during deserialization and the catalog price is used instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: MenuItemId,
    pub quantity: NonZeroU32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LineItem {
    /// Create a line item without a note.
    #[must_use]
    pub const fn new(item_id: MenuItemId, quantity: NonZeroU32) -> Self {
        Self {
            item_id,
            quantity,
            note: None,
        }
    }

    /// Attach a kitchen note ("no onions").
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Current catalog entry for a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct CatalogItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Decimal,
    pub is_available: bool,
}

/// Read access to current menu prices and availability.
pub trait Catalog {
    /// Look up an item by id, available or not.
    fn item(&self, id: MenuItemId) -> Option<&CatalogItem>;
}

impl<S: BuildHasher> Catalog for HashMap<MenuItemId, CatalogItem, S> {
    fn item(&self, id: MenuItemId) -> Option<&CatalogItem> {
        self.get(&id)
    }
}

impl Catalog for [CatalogItem] {
    fn item(&self, id: MenuItemId) -> Option<&CatalogItem> {
        self.iter().find(|entry| entry.id == id)
    }
}

impl Catalog for Vec<CatalogItem> {
    fn item(&self, id: MenuItemId) -> Option<&CatalogItem> {
        self.as_slice().item(id)
    }
}

/// A line item resolved against the catalog.
///
/// This is what gets snapshotted into `order_item` rows, so later menu price
/// changes never rewrite order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub item_id: MenuItemId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: NonZeroU32,
    pub note: Option<String>,
    pub line_total: Decimal,
}

/// Resolve every line item against the catalog.
///
/// # Errors
///
/// Returns [`PricingError::EmptyOrder`] if `items` is empty and
/// [`PricingError::ItemUnavailable`] for the first item that is missing from
/// the catalog or marked unavailable.
pub fn price_lines<C>(items: &[LineItem], catalog: &C) -> Result<Vec<PricedLine>, PricingError>
where
    C: Catalog + ?Sized,
{
    if items.is_empty() {
        return Err(PricingError::EmptyOrder);
    }

    items
        .iter()
        .map(|line| {
            let entry = catalog
                .item(line.item_id)
                .filter(|entry| entry.is_available)
                .ok_or(PricingError::ItemUnavailable(line.item_id))?;

            // A negative menu price is a data entry mistake, never a credit
            let unit_price = entry.price.max(Decimal::ZERO);

            Ok(PricedLine {
                item_id: entry.id,
                name: entry.name.clone(),
                unit_price,
                quantity: line.quantity,
                note: line.note.clone(),
                line_total: unit_price * Decimal::from(line.quantity.get()),
            })
        })
        .collect()
}

/// Sum of catalog price × quantity over all line items.
///
/// # Errors
///
/// Same as [`price_lines`].
pub fn compute_subtotal<C>(items: &[LineItem], catalog: &C) -> Result<Decimal, PricingError>
where
    C: Catalog + ?Sized,
{
    Ok(price_lines(items, catalog)?
        .iter()
        .map(|line| line.line_total)
        .sum())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(num: i64, scale: u32) -> Decimal {
        Decimal::new(num, scale)
    }

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn entry(id: i32, price: Decimal, is_available: bool) -> CatalogItem {
        CatalogItem {
            id: MenuItemId::new(id),
            name: format!("item-{id}"),
            price,
            is_available,
        }
    }

    fn menu() -> Vec<CatalogItem> {
        vec![
            entry(1, dec(20, 0), true),
            entry(2, dec(15, 0), true),
            entry(3, dec(899, 2), false),
        ]
    }

    #[test]
    fn test_subtotal_uses_catalog_price() {
        let items = [
            LineItem::new(MenuItemId::new(1), qty(2)),
            LineItem::new(MenuItemId::new(2), qty(1)),
        ];
        assert_eq!(compute_subtotal(&items, &menu()).unwrap(), dec(55, 0));
    }

    #[test]
    fn test_client_price_is_ignored() {
        let items: Vec<LineItem> = serde_json::from_str(
            r#"[{"item_id": 1, "quantity": 3, "price": "0.01"}]"#,
        )
        .unwrap();
        assert_eq!(compute_subtotal(&items, &menu()).unwrap(), dec(60, 0));
    }

    #[test]
    fn test_zero_quantity_rejected_at_parse() {
        let parsed: Result<Vec<LineItem>, _> =
            serde_json::from_str(r#"[{"item_id": 1, "quantity": 0}]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_empty_order() {
        assert_eq!(
            compute_subtotal(&[], &menu()),
            Err(PricingError::EmptyOrder)
        );
    }

    #[test]
    fn test_unknown_item() {
        let items = [LineItem::new(MenuItemId::new(99), qty(1))];
        assert_eq!(
            compute_subtotal(&items, &menu()),
            Err(PricingError::ItemUnavailable(MenuItemId::new(99)))
        );
    }

    #[test]
    fn test_unavailable_item() {
        let items = [
            LineItem::new(MenuItemId::new(1), qty(1)),
            LineItem::new(MenuItemId::new(3), qty(1)),
        ];
        assert_eq!(
            compute_subtotal(&items, &menu()),
            Err(PricingError::ItemUnavailable(MenuItemId::new(3)))
        );
    }

    #[test]
    fn test_hashmap_catalog() {
        let catalog: HashMap<_, _> = menu().into_iter().map(|e| (e.id, e)).collect();
        let items = [LineItem::new(MenuItemId::new(2), qty(4))];
        assert_eq!(compute_subtotal(&items, &catalog).unwrap(), dec(60, 0));
    }

    #[test]
    fn test_price_lines_snapshot() {
        let items = [LineItem::new(MenuItemId::new(1), qty(2)).with_note("extra spicy")];
        let lines = price_lines(&items, &menu()).unwrap();
        assert_eq!(lines.len(), 1);
        let line = lines.first().unwrap();
        assert_eq!(line.name, "item-1");
        assert_eq!(line.unit_price, dec(20, 0));
        assert_eq!(line.line_total, dec(40, 0));
        assert_eq!(line.note.as_deref(), Some("extra spicy"));
    }

    #[test]
    fn test_negative_catalog_price_clamped() {
        let catalog = vec![entry(7, dec(-5, 0), true)];
        let items = [LineItem::new(MenuItemId::new(7), qty(2))];
        assert_eq!(compute_subtotal(&items, &catalog).unwrap(), Decimal::ZERO);
    }
}
