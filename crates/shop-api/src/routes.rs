//! # Routes
//!
//! Axum router configuration for the shop API.

use crate::auth::require_auth;
use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes (under `/api`, 🔒 = bearer token required):
/// - Auth:
///   - POST /auth/register
///   - POST /auth/login
/// - Products:
///   - GET    /products
///   - GET    /products/{id}
///   - POST   /products 🔒
///   - PUT    /products/{id} 🔒
///   - DELETE /products/{id} 🔒
/// - Coupons:
///   - GET  /coupons
///   - POST /coupons/apply 🔒
///   - POST /coupons/create (🔒 when `coupon_create_requires_auth`)
/// - Orders:
///   - POST   /orders 🔒
///   - GET    /orders 🔒
///   - DELETE /orders/{id} 🔒
///
/// Plus `GET /health` and `GET /` outside `/api`.
pub fn create_router(state: AppState) -> Router {
    // Any origin, as the storefront may be served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth = middleware::from_fn_with_state(state.clone(), require_auth);

    let create_coupon = if state.config.coupon_create_requires_auth {
        post(handlers::create_coupon).route_layer(auth.clone())
    } else {
        post(handlers::create_coupon)
    };

    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login));

    // Reads are public, writes need a token
    let product_routes = Router::new()
        .route(
            "/api/products",
            get(handlers::list_products).merge(post(handlers::create_product).route_layer(auth.clone())),
        )
        .route(
            "/api/products/{id}",
            get(handlers::get_product).merge(
                put(handlers::update_product)
                    .delete(handlers::delete_product)
                    .route_layer(auth.clone()),
            ),
        );

    let coupon_routes = Router::new()
        .route("/api/coupons", get(handlers::list_coupons))
        .route("/api/coupons/apply", post(handlers::apply_coupon).route_layer(auth.clone()))
        .route("/api/coupons/create", create_coupon);

    let order_routes = Router::new()
        .route("/api/orders", post(handlers::create_order).get(handlers::list_orders))
        .route("/api/orders/{id}", delete(handlers::delete_order))
        .route_layer(auth);

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .merge(auth_routes)
        .merge(product_routes)
        .merge(coupon_routes)
        .merge(order_routes)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}
