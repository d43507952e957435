//! # MongoDB Configuration
//!
//! Connection settings for the document store.
//! Loaded from environment variables.

use shop_core::StoreError;
use std::env;

const DEFAULT_DATABASE: &str = "shop";

/// MongoDB connection configuration
#[derive(Clone)]
pub struct MongoConfig {
    /// Connection string (mongodb:// or mongodb+srv://)
    pub uri: String,

    /// Database holding the users/products/coupons/orders collections
    pub database: String,

    /// Application name reported to the server
    pub app_name: String,
}

impl MongoConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `MONGODB_URI`
    ///
    /// Optional:
    /// - `MONGODB_DATABASE` (default `shop`)
    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();

        let uri = env::var("MONGODB_URI")
            .map_err(|_| StoreError::Configuration("MONGODB_URI not set".to_string()))?;

        if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
            return Err(StoreError::Configuration(
                "MONGODB_URI must start with mongodb:// or mongodb+srv://".to_string(),
            ));
        }

        let database = env::var("MONGODB_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        if database.trim().is_empty() {
            return Err(StoreError::Configuration(
                "MONGODB_DATABASE cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            uri,
            database,
            app_name: "shop-backend".to_string(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            app_name: "shop-backend".to_string(),
        }
    }

    /// Connection string with any credentials masked, safe for logs
    pub fn redacted_uri(&self) -> String {
        match (self.uri.find("://"), self.uri.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}://***{}", &self.uri[..scheme_end], &self.uri[at..])
            }
            _ => self.uri.clone(),
        }
    }
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("uri", &self.redacted_uri())
            .field("database", &self.database)
            .field("app_name", &self.app_name)
            .finish()
    }
}
