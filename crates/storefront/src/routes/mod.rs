//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Menu
//! GET  /api/menu               - Available menu items
//! GET  /api/branches           - Branches taking orders
//!
//! # Checkout
//! POST /api/checkout/quote     - Price a cart
//! POST /api/checkout/promo     - Price a cart with a promo code
//! POST /api/orders             - Place an order
//!
//! # Account (requires auth)
//! GET  /api/account/orders     - Order history
//!
//! # Promo codes (branch managers and administrators)
//! GET  /api/admin/promo-codes             - List codes
//! POST /api/admin/promo-codes             - Create a code
//! POST /api/admin/promo-codes/{id}/active - Enable or disable a code
//! ```

pub mod account;
pub mod checkout;
pub mod menu;
pub mod orders;
pub mod promo_codes;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/quote", post(checkout::quote))
        .route("/promo", post(checkout::apply_promo))
}

/// Create the promo code administration router.
pub fn promo_code_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(promo_codes::list).post(promo_codes::create))
        .route("/{id}/active", post(promo_codes::set_active))
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .route("/menu", get(menu::menu))
        .route("/branches", get(menu::branches))
        .nest("/checkout", checkout_routes())
        .route("/orders", post(orders::place))
        .route("/account/orders", get(account::orders))
        .nest("/admin/promo-codes", promo_code_routes());

    Router::new().nest("/api", api)
}

/// Build the complete application with health checks and middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
