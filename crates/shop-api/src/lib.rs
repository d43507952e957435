//! # shop-api
//!
//! HTTP API layer for the shop backend.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - JWT session tokens and bcrypt password hashing
//! - REST endpoints for accounts, products, coupons and orders
//!
//! ## Endpoints
//!
//! | Method | Path | Auth | Description |
//! |--------|------|------|-------------|
//! | GET | `/health` | | Health check |
//! | POST | `/api/auth/register` | | Create account |
//! | POST | `/api/auth/login` | | Get session token |
//! | GET | `/api/products` | | List products |
//! | GET | `/api/products/{id}` | | Get product |
//! | POST | `/api/products` | Bearer | Create product |
//! | PUT | `/api/products/{id}` | Bearer | Update product |
//! | DELETE | `/api/products/{id}` | Bearer | Delete product |
//! | GET | `/api/coupons` | | List active coupons |
//! | POST | `/api/coupons/apply` | Bearer | Quote a coupon for a cart |
//! | POST | `/api/coupons/create` | optional | Create coupon |
//! | POST | `/api/orders` | Bearer | Place order |
//! | GET | `/api/orders` | Bearer | List own orders |
//! | DELETE | `/api/orders/{id}` | Bearer | Cancel own order |

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::TokenService;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::{AppConfig, AppState, StoreBackend};
