//! JSON body extractor.
//!
//! Wraps [`axum::Json`] so malformed bodies are answered with the same
//! `{"error", "message"}` body as every other API failure instead of axum's
//! plain-text rejection.

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Extractor that deserializes a JSON request body.
///
/// # Example
///
/// ```rust,ignore
/// async fn quote(ApiJson(request): ApiJson<QuoteRequest>) -> impl IntoResponse {
///     format!("{} lines", request.items.len())
/// }
/// ```
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use axum::{
        body::Body,
        http::{StatusCode, header},
        response::IntoResponse,
    };
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Line {
        quantity: NonZeroU32,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    async fn rejection(req: Request) -> (StatusCode, serde_json::Value) {
        let Err(err) = ApiJson::<Line>::from_request(req, &()).await else {
            panic!("body should be rejected");
        };
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let req = request(Some("application/json"), r#"{"quantity": 2}"#);
        let ApiJson(line) = ApiJson::<Line>::from_request(req, &()).await.unwrap();
        assert_eq!(line.quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_invalid_value_gets_json_error_body() {
        let (status, body) =
            rejection(request(Some("application/json"), r#"{"quantity": 0}"#)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "invalid_body");
        assert!(body["message"].as_str().unwrap().contains("quantity"));
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let (status, body) = rejection(request(Some("application/json"), "{")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_body");
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let (status, body) = rejection(request(None, r#"{"quantity": 1}"#)).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"], "invalid_body");
    }
}
