//! Cart pricing endpoints.
//!
//! Quotes never write anything. Clients send item ids and quantities only;
//! prices always come from the menu table.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use saffron_core::{DeliveryType, LineItem, PricingResult, PromoQuote};

use crate::error::Result;
use crate::middleware::{ApiJson, OptionalAuth};
use crate::state::AppState;

/// Body of `POST /api/checkout/quote`.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
}

/// Body of `POST /api/checkout/promo`.
#[derive(Debug, Deserialize)]
pub struct PromoQuoteRequest {
    pub code: String,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
}

/// Price a cart.
#[instrument(skip_all, fields(items = request.items.len(), delivery_type = ?request.delivery_type))]
pub async fn quote(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QuoteRequest>,
) -> Result<Json<PricingResult>> {
    let pricing = state
        .checkout()
        .quote(&request.items, request.delivery_type)
        .await?;
    Ok(Json(pricing))
}

/// Validate a promo code against a cart and price it.
#[instrument(skip_all, fields(code = %request.code, delivery_type = ?request.delivery_type))]
pub async fn apply_promo(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ApiJson(request): ApiJson<PromoQuoteRequest>,
) -> Result<Json<PromoQuote>> {
    let quote = state
        .checkout()
        .quote_with_promo(
            &request.code,
            &request.items,
            request.delivery_type,
            user.map(|u| u.id),
        )
        .await?;
    Ok(Json(quote))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_request_defaults_to_pickup() {
        let request: QuoteRequest =
            serde_json::from_str(r#"{"items": [{"item_id": 1, "quantity": 3}]}"#).unwrap();
        assert_eq!(request.delivery_type, DeliveryType::Pickup);
        assert_eq!(request.items.len(), 1);
    }

    #[test]
    fn test_unknown_delivery_type_is_rejected() {
        let result = serde_json::from_str::<QuoteRequest>(
            r#"{"items": [], "delivery_type": "drone"}"#,
        );
        assert!(result.is_err());
    }
}
