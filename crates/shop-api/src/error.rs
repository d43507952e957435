//! # API Errors
//!
//! Maps `StoreError` onto HTTP responses with a `{ "msg": ... }` body.
//! Server-side failures are logged and reported to the client generically.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shop_core::StoreError;
use thiserror::Error;
use tracing::{debug, error};

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub msg: String,
    /// Present on coupon rejections, always zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            discount: None,
        }
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = Some(discount);
        self
    }
}

/// Handler error: a `StoreError` that knows how to render itself
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub StoreError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError(StoreError::Unauthorized(msg.into()))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError(StoreError::InvalidRequest(msg.into()))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn store_error_to_response(err: &StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match err {
        StoreError::Unauthorized(msg) | StoreError::InvalidRequest(msg) => ErrorResponse::new(msg.as_str()),
        StoreError::Duplicate { field } => ErrorResponse::new(format!("{} already in use", field)),
        StoreError::CouponRejected(reason) => ErrorResponse::new(reason.message()).with_discount(0.0),
        StoreError::NotFound { .. } => ErrorResponse::new("Not found"),
        _ => ErrorResponse::new("Server error"),
    };

    (status, Json(body))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            debug!("Request rejected: {}", self.0);
        } else {
            error!("Request failed: {}", self.0);
        }
        store_error_to_response(&self.0).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// `Json` extractor whose rejections render as `400 { "msg": ... }`
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::CouponRejection;

    fn body_of(err: StoreError) -> serde_json::Value {
        let (_, Json(body)) = store_error_to_response(&err);
        serde_json::to_value(body).unwrap()
    }

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error");
        assert_eq!(err.msg, "Test error");
        assert!(err.discount.is_none());
    }

    #[test]
    fn test_coupon_rejection_carries_zero_discount() {
        let body = body_of(StoreError::CouponRejected(CouponRejection::Expired));
        assert_eq!(body["msg"], "Coupon expired");
        assert_eq!(body["discount"], 0.0);
    }

    #[test]
    fn test_server_errors_are_generic() {
        let err = ApiError(StoreError::Database("socket closed at 10.0.0.7:27017".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(err.0);
        assert_eq!(body["msg"], "Server error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::unauthorized("No token").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::bad_request("nope").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(StoreError::product_not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
    }
}
