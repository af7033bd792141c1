//! Business logic services for storefront.
//!
//! - `checkout` - Quotes, promo codes and order placement

pub mod checkout;

pub use checkout::{CheckoutError, CheckoutService, OrderRequest};
