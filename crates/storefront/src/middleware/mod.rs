//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler through the extractors in [`auth`].
//! Request bodies go through [`ApiJson`].

pub mod auth;
pub mod json;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, RequirePromoManager};
pub use json::ApiJson;
pub use session::create_session_layer;
