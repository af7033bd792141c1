//! Order placement.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{ApiJson, OptionalAuth};
use crate::models::OrderWithItems;
use crate::services::OrderRequest;
use crate::state::AppState;

/// Re-price the submitted cart and store the order.
#[instrument(
    skip_all,
    fields(
        branch_id = %request.branch_id,
        delivery_type = ?request.delivery_type,
        items = request.items.len(),
    )
)]
pub async fn place(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ApiJson(request): ApiJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    let order = state
        .checkout()
        .place_order(request, user.map(|u| u.id))
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
