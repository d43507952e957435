//! # Request Handlers
//!
//! Axum request handlers for the shop API.
//! Protected handlers read the caller from the `Identity` extension set by
//! `auth::require_auth`.

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult, AppJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use shop_core::{
    coupon, ApplyCoupon, Coupon, CouponQuote, CouponRejection, Credentials, Identity, NewCoupon,
    NewOrder, NewUser, Order, Product, ProductInput, ProductPatch, PublicUser, Registration,
    StoreError,
};
use tracing::{info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Plain confirmation body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub msg: String,
    pub user: PublicUser,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub msg: String,
    pub token: String,
    pub user: PublicUser,
}

const REGISTER_REJECTED: &str = "Email already in use or bad request";
const WRONG_CREDENTIALS: &str = "Wrong email or password";

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "shop-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.repos.backend()
    }))
}

// --- Auth -------------------------------------------------------------------

/// Create an account
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<AppJson<Registration>, ApiError>,
) -> ApiResult<Json<RegisterResponse>> {
    let AppJson(registration) = payload.map_err(|_| ApiError::bad_request(REGISTER_REJECTED))?;
    registration
        .validate()
        .map_err(|_| ApiError::bad_request(REGISTER_REJECTED))?;

    let Registration {
        name,
        email,
        password,
    } = registration;

    let password_hash = hash_password(password, state.config.bcrypt_cost).await?;

    let user = state
        .repos
        .users
        .insert_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate { .. } | StoreError::InvalidRequest(_) => {
                ApiError::bad_request(REGISTER_REJECTED)
            }
            other => other.into(),
        })?;

    info!("Registered user {}", user.id);

    Ok(Json(RegisterResponse {
        msg: "Account created".to_string(),
        user: PublicUser {
            id: None,
            name: user.name,
            email: user.email,
        },
    }))
}

/// Exchange credentials for a session token
#[instrument(skip(state, credentials))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(credentials): AppJson<Credentials>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .repos
        .users
        .find_user_by_email(&credentials.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized(WRONG_CREDENTIALS))?;

    if !verify_password(credentials.password, user.password.clone()).await? {
        return Err(ApiError::unauthorized(WRONG_CREDENTIALS));
    }

    let token = state.tokens.issue(&user)?;
    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        msg: "Login successful".to_string(),
        token,
        user: user.public(),
    }))
}

// --- Products ---------------------------------------------------------------

/// Get the whole catalog
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.repos.products.list_products().await?))
}

/// Get single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .repos
        .products
        .get_product(&product_id)
        .await?
        .ok_or_else(|| StoreError::product_not_found(&product_id))?;

    Ok(Json(product))
}

#[instrument(skip(state, identity, input), fields(user = %identity.id))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(input): AppJson<ProductInput>,
) -> ApiResult<Json<Product>> {
    input.validate()?;
    let product = state.repos.products.insert_product(input).await?;
    info!("Created product {}", product.id);
    Ok(Json(product))
}

#[instrument(skip(state, identity, patch), fields(user = %identity.id))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(product_id): Path<String>,
    AppJson(patch): AppJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    patch.validate()?;
    let product = state
        .repos
        .products
        .update_product(&product_id, patch)
        .await?
        .ok_or_else(|| StoreError::product_not_found(&product_id))?;

    Ok(Json(product))
}

#[instrument(skip(state, identity), fields(user = %identity.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.repos.products.delete_product(&product_id).await?;
    Ok(Json(MessageResponse::new("Deleted")))
}

// --- Coupons ----------------------------------------------------------------

/// Enabled, unexpired coupons
pub async fn list_coupons(State(state): State<AppState>) -> ApiResult<Json<Vec<Coupon>>> {
    Ok(Json(state.repos.coupons.list_active_coupons(Utc::now()).await?))
}

/// Quote a coupon against the caller's cart
#[instrument(skip(state, identity, payload), fields(user = %identity.id))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<AppJson<ApplyCoupon>, ApiError>,
) -> ApiResult<Json<CouponQuote>> {
    let AppJson(request) =
        payload.map_err(|_| ApiError(StoreError::CouponRejected(CouponRejection::MissingInput)))?;

    let quote = coupon::apply(state.repos.coupons.as_ref(), request, Utc::now()).await?;
    info!("Applied coupon {}: discount={}", quote.code, quote.discount);

    Ok(Json(quote))
}

#[instrument(skip(state, new_coupon))]
pub async fn create_coupon(
    State(state): State<AppState>,
    AppJson(new_coupon): AppJson<NewCoupon>,
) -> ApiResult<Json<Coupon>> {
    let new_coupon = new_coupon.normalized()?;
    let coupon = state.repos.coupons.insert_coupon(new_coupon).await?;
    info!("Created coupon {}", coupon.code);
    Ok(Json(coupon))
}

// --- Orders -----------------------------------------------------------------

/// Record an order exactly as submitted, owned by the caller
#[instrument(skip(state, identity, order), fields(user = %identity.id, items = order.items.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    AppJson(order): AppJson<NewOrder>,
) -> ApiResult<Json<Order>> {
    let order = state
        .repos
        .orders
        .insert_order(&identity.id, order, Utc::now())
        .await?;

    info!(
        "Created order {}: items={}, total={}, items_subtotal={}",
        order.id,
        order.item_count(),
        order.total,
        order.items_subtotal()
    );
    Ok(Json(order))
}

/// The caller's orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.repos.orders.list_orders_for_user(&identity.id).await?))
}

/// Cancel one of the caller's orders. Reports success even if nothing matched.
#[instrument(skip(state, identity), fields(user = %identity.id))]
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = state
        .repos
        .orders
        .delete_order_for_user(&order_id, &identity.id)
        .await?;

    info!("Cancel order {}: removed={}", order_id, removed);
    Ok(Json(MessageResponse::new("Order cancelled")))
}
