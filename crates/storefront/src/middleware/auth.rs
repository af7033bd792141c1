//! Authentication extractors.
//!
//! Read the signed-in account from the session. Rejections use the same
//! JSON error body as every other API failure.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};

/// Load the account stored in the request's session, if any.
async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    let user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;
    set_sentry_user(&user.id);
    Some(user)
}

/// Extractor that requires a signed-in account.
///
/// # Example
///
/// ```rust,ignore
/// async fn order_history(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Orders for {}", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
    }
}

/// Extractor that optionally gets the signed-in account.
///
/// Guests check out too; per-user promo limits only apply when this is `Some`.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Extractor for accounts allowed to manage promo codes.
pub struct RequirePromoManager(pub CurrentUser);

impl<S> FromRequestParts<S> for RequirePromoManager
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))?;

        if !user.role.can_manage_promotions() {
            tracing::warn!(user_id = %user.id, role = %user.role, "Promo management denied");
            return Err(AppError::Forbidden(
                "Promo codes can only be managed by branch managers and administrators"
                    .to_string(),
            ));
        }

        Ok(Self(user))
    }
}
