//! Saffron Core - Shared types and the order pricing engine.
//!
//! This crate provides the pieces shared by all Saffron components:
//! - `storefront` - Customer-facing ordering API and staff promo management
//! - `cli` - Command-line tools for migrations and promo codes
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Catalog entries, delivery settings, promo codes and
//! usage counts are fetched by the caller and handed in as lookups, so every
//! pricing decision is deterministic for a given set of inputs.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, roles and order statuses
//! - [`pricing`] - Subtotal, delivery fee, promo validation and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{
    AppliedDiscount, Catalog, CatalogItem, DeliverySettings, DeliveryType, Discount, DiscountKind,
    LineItem, NewPromoCode, PricedLine, PricingEngine, PricingError, PricingResult, PromoCode,
    PromoCodeLookup, PromoDefinitionError, PromoQuote, PromoRequest, UsageLookup,
};
pub use types::*;
