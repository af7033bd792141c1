//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as a JSON body
//! `{"error": <kind>, "message": <text>}`; server-side failures are captured
//! to Sentry first and never leak their details.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use saffron_core::{PricingError, PromoDefinitionError};

use crate::db::RepositoryError;
use crate::services::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// The order could not be priced or the promo code was rejected.
    #[error("{0}")]
    Pricing(#[from] PricingError),

    /// An administrator submitted an invalid promo code definition.
    #[error("{0}")]
    PromoDefinition(#[from] PromoDefinitionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body is not the JSON the endpoint expects.
    #[error("Invalid body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PromoDefinition(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidBody(rejection) => rejection.status(),
        }
    }

    /// Stable machine-readable name for the body's `error` field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Pricing(err) => err.kind(),
            Self::PromoDefinition(_) => "invalid_promo_code",
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => "not_found",
            Self::Database(RepositoryError::Conflict(_)) => "conflict",
            Self::Database(_) | Self::Internal(_) => "internal",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::BadRequest(_) => "bad_request",
            Self::InvalidBody(_) => "invalid_body",
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg))
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Pricing(err) => err.to_string(),
            Self::PromoDefinition(err) => err.to_string(),
            Self::InvalidBody(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if let Self::Pricing(err) = &self {
            tracing::debug!(kind = err.kind(), "Pricing rejected");
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Pricing(e) => Self::Pricing(e),
            CheckoutError::Repository(e) => Self::Database(e),
            CheckoutError::InvalidContact(msg) | CheckoutError::OrderTooLarge(msg) => {
                Self::BadRequest(msg)
            }
            e @ CheckoutError::BranchUnavailable(_) => Self::BadRequest(e.to_string()),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in account.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
