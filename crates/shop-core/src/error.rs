//! # Store Error Types
//!
//! Typed error handling for the shop backend.
//! Every repository and service operation returns `Result<T, StoreError>`.

use crate::coupon::CouponRejection;
use thiserror::Error;

/// Core error type for all shop operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing, malformed or expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid request data (validation failures, malformed bodies)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unique constraint violated (user email, coupon code)
    #[error("Duplicate value for unique field: {field}")]
    Duplicate { field: &'static str },

    /// A coupon rule refused the cart
    #[error("Coupon rejected: {0}")]
    CouponRejected(CouponRejection),

    /// Document not found by id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Backing store failure
    #[error("Database error: {0}")]
    Database(String),

    /// Password hashing or verification failed to run
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Session token could not be issued
    #[error("Token error: {0}")]
    Token(String),

    /// Configuration errors (missing secrets, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Shorthand for a missing product
    pub fn product_not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: "Product",
            id: id.into(),
        }
    }

    /// Returns true if the caller sent something wrong (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Unauthorized(_) => 401,
            StoreError::InvalidRequest(_) => 400,
            StoreError::Duplicate { .. } => 400,
            StoreError::CouponRejected(_) => 400,
            StoreError::NotFound { .. } => 404,
            StoreError::Database(_) => 500,
            StoreError::PasswordHash(_) => 500,
            StoreError::Token(_) => 500,
            StoreError::Configuration(_) => 500,
            StoreError::Internal(_) => 500,
            StoreError::Serialization(_) => 500,
        }
    }
}

impl From<CouponRejection> for StoreError {
    fn from(reason: CouponRejection) -> Self {
        StoreError::CouponRejected(reason)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for shop operations
pub type StoreResult<T> = Result<T, StoreError>;
