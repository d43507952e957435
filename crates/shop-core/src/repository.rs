//! # Repository Traits
//!
//! One async trait per collection. Handlers only see these traits, so the
//! backing store can be swapped through configuration.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Store (trait)                          │
//! │  UserRepository + ProductRepository                          │
//! │  + CouponRepository + OrderRepository                        │
//! └──────────────────────────────────────────────────────────────┘
//!                             ▲
//!               ┌─────────────┴─────────────┐
//!       ┌───────┴───────┐           ┌───────┴───────┐
//!       │  MemoryStore  │           │  MongoStore   │
//!       │  (shop-core)  │           │ (shop-mongo)  │
//!       └───────────────┘           └───────────────┘
//! ```

use crate::coupon::{Coupon, NewCoupon};
use crate::error::StoreResult;
use crate::order::{NewOrder, Order};
use crate::product::{Product, ProductInput, ProductPatch};
use crate::user::{NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Accounts, unique by email
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with `StoreError::Duplicate` if the email exists.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// The product catalog
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, in insertion order
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// `None` for unknown or unparseable ids
    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>>;

    async fn insert_product(&self, input: ProductInput) -> StoreResult<Product>;

    /// Returns the updated product, or `None` if the id matched nothing
    async fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Option<Product>>;

    /// Idempotent: deleting a missing id is not an error
    async fn delete_product(&self, id: &str) -> StoreResult<()>;
}

/// Coupons, unique by (uppercase) code
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Enabled coupons whose expiry is unset or not before `now`
    async fn list_active_coupons(&self, now: DateTime<Utc>) -> StoreResult<Vec<Coupon>>;

    /// Exact match on an already-uppercased code, enabled coupons only
    async fn find_enabled_by_code(&self, code: &str) -> StoreResult<Option<Coupon>>;

    /// Persist a normalized coupon. Fails with `StoreError::Duplicate` if the code exists.
    async fn insert_coupon(&self, coupon: NewCoupon) -> StoreResult<Coupon>;
}

/// Orders, always scoped to their owning user
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert_order(
        &self,
        user_id: &str,
        order: NewOrder,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Order>;

    async fn list_orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>>;

    /// Delete where both id and owner match. Returns whether anything was removed.
    async fn delete_order_for_user(&self, id: &str, user_id: &str) -> StoreResult<bool>;
}

/// A complete backing store
pub trait Store: UserRepository + ProductRepository + CouponRepository + OrderRepository {
    /// Name for logging and health output
    fn backend_name(&self) -> &'static str;
}

/// Type aliases for shared repository handles (dynamic dispatch)
pub type SharedUserRepository = Arc<dyn UserRepository>;
pub type SharedProductRepository = Arc<dyn ProductRepository>;
pub type SharedCouponRepository = Arc<dyn CouponRepository>;
pub type SharedOrderRepository = Arc<dyn OrderRepository>;

/// Per-collection handles cut from a single store
#[derive(Clone)]
pub struct Repositories {
    pub users: SharedUserRepository,
    pub products: SharedProductRepository,
    pub coupons: SharedCouponRepository,
    pub orders: SharedOrderRepository,
    backend: &'static str,
}

impl Repositories {
    /// Split one store into its four repository handles
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: Store + 'static,
    {
        Self {
            backend: store.backend_name(),
            users: store.clone(),
            products: store.clone(),
            coupons: store.clone(),
            orders: store,
        }
    }

    /// Name of the backing store
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
