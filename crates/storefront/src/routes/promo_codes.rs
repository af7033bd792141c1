//! Promo code administration.
//!
//! Restricted to branch managers and administrators.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use saffron_core::{NewPromoCode, PromoCode, PromoCodeId};

use crate::db::PromoCodeRepository;
use crate::error::Result;
use crate::middleware::{ApiJson, RequirePromoManager};
use crate::state::AppState;

/// Body of `POST /api/admin/promo-codes/{id}/active`.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// All promo codes, newest first.
#[instrument(skip_all, fields(user_id = %manager.id))]
pub async fn list(
    State(state): State<AppState>,
    RequirePromoManager(manager): RequirePromoManager,
) -> Result<Json<Vec<PromoCode>>> {
    let promos = PromoCodeRepository::new(state.pool()).list().await?;
    Ok(Json(promos))
}

/// Validate and store a new promo code.
#[instrument(skip_all, fields(user_id = %manager.id, code = %new.code))]
pub async fn create(
    State(state): State<AppState>,
    RequirePromoManager(manager): RequirePromoManager,
    ApiJson(new): ApiJson<NewPromoCode>,
) -> Result<(StatusCode, Json<PromoCode>)> {
    new.validate()?;

    let promo = PromoCodeRepository::new(state.pool()).create(&new).await?;
    tracing::info!(
        promo_code_id = %promo.id,
        code = %promo.code,
        kind = %promo.kind,
        "Promo code created"
    );

    Ok((StatusCode::CREATED, Json(promo)))
}

/// Enable or disable a promo code.
#[instrument(skip_all, fields(user_id = %manager.id, promo_code_id = %id))]
pub async fn set_active(
    State(state): State<AppState>,
    RequirePromoManager(manager): RequirePromoManager,
    Path(id): Path<PromoCodeId>,
    ApiJson(request): ApiJson<SetActiveRequest>,
) -> Result<Json<PromoCode>> {
    let promo = PromoCodeRepository::new(state.pool())
        .set_active(id, request.is_active)
        .await?;
    tracing::info!(code = %promo.code, is_active = promo.is_active, "Promo code updated");
    Ok(Json(promo))
}
