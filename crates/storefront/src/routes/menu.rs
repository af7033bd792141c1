//! Menu and branch listings.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::{BranchRepository, MenuRepository};
use crate::error::Result;
use crate::models::{Branch, MenuItem};
use crate::state::AppState;

/// Available menu items, grouped by category.
#[instrument(skip_all)]
pub async fn menu(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>> {
    let items = MenuRepository::new(state.pool()).list_available().await?;
    Ok(Json(items))
}

/// Branches currently taking orders.
#[instrument(skip_all)]
pub async fn branches(State(state): State<AppState>) -> Result<Json<Vec<Branch>>> {
    let branches = BranchRepository::new(state.pool()).list_active().await?;
    Ok(Json(branches))
}
