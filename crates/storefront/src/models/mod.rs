//! Domain models for storefront.
//!
//! Row types read from `PostgreSQL` and the shapes returned by the API.
//! Pricing types (`PromoCode`, `CatalogItem`, `DeliverySettings`) live in
//! `saffron-core` and are decoded directly from their rows.

pub mod menu;
pub mod order;
pub mod session;

pub use menu::{Branch, MenuItem};
pub use order::{ContactDetails, Order, OrderItem, OrderWithItems};
pub use session::{CurrentUser, keys as session_keys};
