//! Order pricing and promo-code evaluation.
//!
//! Everything in this module is a pure function of its inputs. The caller
//! fetches catalog entries, delivery settings, the promo record and prior
//! usage counts, then hands them in through the [`Catalog`],
//! [`PromoCodeLookup`] and [`UsageLookup`] traits.
//!
//! # Pipeline
//!
//! ```text
//! line items ──► compute_subtotal ──► validate_promo_code ──► compute_discount
//!                      │                                            │
//!                      └──► compute_delivery_fee ──────► compute_total
//! ```
//!
//! [`PricingEngine`] wires the steps together for the two checkout entry
//! points: a plain quote and a quote with a promo code applied.

pub mod catalog;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod promo;

pub use catalog::{Catalog, CatalogItem, LineItem, PricedLine, compute_subtotal, price_lines};
pub use delivery::{DeliverySettings, DeliveryType, compute_delivery_fee};
pub use engine::{AppliedDiscount, PricingEngine, PricingResult, PromoQuote, PromoRequest, compute_total};
pub use error::PricingError;
pub use promo::{
    Discount, DiscountKind, NewPromoCode, PromoCode, PromoCodeLookup, PromoDefinitionError,
    UsageLookup, compute_discount, validate_promo_code,
};
