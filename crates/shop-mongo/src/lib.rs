//! # shop-mongo
//!
//! MongoDB store for the shop backend.
//!
//! `MongoStore` implements every repository trait from `shop-core` over the
//! `users`, `products`, `coupons` and `orders` collections. Unique indexes on
//! `users.email` and `coupons.code` back the duplicate checks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_core::Repositories;
//! use shop_mongo::{MongoConfig, MongoStore};
//!
//! // MONGODB_URI=mongodb://localhost:27017
//! let store = Arc::new(MongoStore::from_env().await?);
//! let repos = Repositories::new(store.clone());
//!
//! let products = repos.products.list_products().await?;
//!
//! // On shutdown:
//! store.shutdown().await;
//! ```

pub mod config;
pub mod documents;
pub mod store;

// Re-exports
pub use config::MongoConfig;
pub use store::MongoStore;
