//! # Application State
//!
//! Shared state for the Axum application.
//! Built once at startup from `AppConfig`; holds the repositories, the token
//! service and the configuration.

use crate::auth::TokenService;
use chrono::Duration;
use shop_core::{MemoryStore, Repositories, SeedData, StoreError, StoreResult};
use shop_mongo::MongoStore;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Which `Store` implementation backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(StoreError::Configuration(format!(
                "STORE_BACKEND must be 'mongodb' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Session token lifetime
    pub token_ttl: Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Backing store
    pub store_backend: StoreBackend,
    /// Put `POST /api/coupons/create` behind the auth middleware
    pub coupon_create_requires_auth: bool,
    /// TOML file with initial products and coupons
    pub seed_file: Option<String>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> StoreResult<T> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| StoreError::Configuration(format!("Invalid {} value", key))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> StoreResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| StoreError::Configuration("JWT_SECRET not set".to_string()))?;

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_or("PORT", 5500)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            jwt_secret,
            token_ttl: Duration::seconds(env_or("JWT_TTL_SECS", 7200)?),
            bcrypt_cost: env_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            store_backend: env_or("STORE_BACKEND", StoreBackend::MongoDb)?,
            coupon_create_requires_auth: env_or("COUPON_CREATE_REQUIRES_AUTH", false)?,
            seed_file: env::var("SEED_FILE").ok().filter(|path| !path.trim().is_empty()),
        };
        config.validate()?;

        Ok(config)
    }

    /// Create config with explicit values (for testing): memory store, defaults elsewhere
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5500,
            environment: "test".to_string(),
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::hours(2),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            store_backend: StoreBackend::Memory,
            coupon_create_requires_auth: false,
            seed_file: None,
        }
    }

    /// Builder: set bcrypt cost
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Builder: protect coupon creation
    pub fn with_protected_coupon_creation(mut self, protected: bool) -> Self {
        self.coupon_create_requires_auth = protected;
        self
    }

    fn validate(&self) -> StoreResult<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(StoreError::Configuration("JWT_SECRET cannot be empty".to_string()));
        }
        if self.token_ttl <= Duration::zero() {
            return Err(StoreError::Configuration("JWT_TTL_SECS must be positive".to_string()));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(StoreError::Configuration(
                "BCRYPT_COST must be between 4 and 31".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> StoreResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| StoreError::Configuration(format!("Invalid bind address {}:{}", self.host, self.port)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("jwt_secret", &"***")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("store_backend", &self.store_backend)
            .field("coupon_create_requires_auth", &self.coupon_create_requires_auth)
            .field("seed_file", &self.seed_file)
            .finish()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Repository handles
    pub repos: Repositories,
    /// Session token issuer/verifier
    pub tokens: TokenService,
    /// Application config
    pub config: AppConfig,
    /// Held so the pool can be closed on shutdown
    mongo: Option<Arc<MongoStore>>,
}

impl AppState {
    /// Build state over already-constructed repositories
    pub fn with_repositories(config: AppConfig, repos: Repositories) -> Self {
        Self {
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl),
            repos,
            config,
            mongo: None,
        }
    }

    /// Open the configured store, apply the seed file, and build state
    pub async fn connect(config: AppConfig) -> StoreResult<Self> {
        let mut mongo = None;
        let repos = match config.store_backend {
            StoreBackend::Memory => {
                warn!("Using in-memory store; data is lost on restart");
                Repositories::new(Arc::new(MemoryStore::new()))
            }
            StoreBackend::MongoDb => {
                let store = Arc::new(MongoStore::from_env().await?);
                mongo = Some(store.clone());
                Repositories::new(store)
            }
        };

        if let Some(path) = &config.seed_file {
            let report = SeedData::from_file(path)?.apply(&repos).await?;
            info!(
                "Seeded {} products and {} coupons from {}",
                report.products, report.coupons, path
            );
        }

        let mut state = Self::with_repositories(config, repos);
        state.mongo = mongo;
        Ok(state)
    }

    /// Release store resources. Call after the server has stopped.
    pub async fn shutdown(&self) {
        if let Some(mongo) = &self.mongo {
            mongo.shutdown().await;
        }
    }
}
