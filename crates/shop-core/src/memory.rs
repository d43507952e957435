//! # In-Memory Store
//!
//! A `Store` kept entirely in process memory. Used by the test suites and by
//! `STORE_BACKEND=memory` for local development. Nothing survives a restart.

use crate::coupon::{Coupon, NewCoupon};
use crate::error::{StoreError, StoreResult};
use crate::order::{NewOrder, Order};
use crate::product::{Product, ProductInput, ProductPatch};
use crate::repository::{CouponRepository, OrderRepository, ProductRepository, Store, UserRepository};
use crate::user::{NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<Product>>,
    coupons: RwLock<Vec<Coupon>>,
    orders: RwLock<Vec<Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }

        let stored = User {
            id: Self::next_id(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, input: ProductInput) -> StoreResult<Product> {
        let product = Product::from_input(Self::next_id(), input);
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Option<Product>> {
        let mut products = self.products.write().await;
        Ok(products.iter_mut().find(|p| p.id == id).map(|product| {
            product.apply(patch);
            product.clone()
        }))
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        self.products.write().await.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn list_active_coupons(&self, now: DateTime<Utc>) -> StoreResult<Vec<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons.iter().filter(|c| c.is_active(now)).cloned().collect())
    }

    async fn find_enabled_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons.iter().find(|c| c.enabled && c.code == code).cloned())
    }

    async fn insert_coupon(&self, coupon: NewCoupon) -> StoreResult<Coupon> {
        let mut coupons = self.coupons.write().await;
        if coupons.iter().any(|c| c.code == coupon.code) {
            return Err(StoreError::Duplicate { field: "code" });
        }

        let stored = Coupon::from_new(Self::next_id(), coupon);
        coupons.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert_order(
        &self,
        user_id: &str,
        order: NewOrder,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Order> {
        let placed = Order::place(Self::next_id(), user_id, order, created_at);
        self.orders.write().await.push(placed.clone());
        Ok(placed)
    }

    async fn list_orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().filter(|o| o.user == user_id).cloned().collect())
    }

    async fn delete_order_for_user(&self, id: &str, user_id: &str) -> StoreResult<bool> {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| !(o.id == id && o.user == user_id));
        Ok(orders.len() != before)
    }
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
