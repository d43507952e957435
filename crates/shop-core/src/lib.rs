//! # shop-core
//!
//! Core types and traits for the shop backend.
//!
//! This crate provides:
//! - `User`, `Product`, `Coupon` and `Order` records plus their validated inputs
//! - Coupon evaluation (`Coupon::quote`, `coupon::apply`)
//! - Repository traits (`UserRepository`, `ProductRepository`, ...) and the `Store` bundle
//! - `MemoryStore`, an in-process `Store`
//! - `SeedData` for populating a store from TOML
//! - `StoreError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{coupon, ApplyCoupon, CartLine, MemoryStore, Repositories};
//!
//! let repos = Repositories::new(Arc::new(MemoryStore::new()));
//!
//! let quote = coupon::apply(
//!     repos.coupons.as_ref(),
//!     ApplyCoupon {
//!         code: Some("welcome10".into()),
//!         cart: Some(vec![CartLine { price: 40.0, qty: 2 }]),
//!     },
//!     Utc::now(),
//! )
//! .await?;
//!
//! assert!(quote.discount <= 80.0);
//! ```

pub mod coupon;
pub mod error;
pub mod memory;
pub mod order;
pub mod product;
pub mod repository;
pub mod seed;
pub mod user;

// Re-exports for convenience
pub use coupon::{
    subtotal, ApplyCoupon, CartLine, Coupon, CouponQuote, CouponRejection, CouponType, NewCoupon,
};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use order::{NewOrder, Order, OrderItem, ProductSnapshot};
pub use product::{Product, ProductInput, ProductPatch};
pub use repository::{
    CouponRepository, OrderRepository, ProductRepository, Repositories, SharedCouponRepository,
    SharedOrderRepository, SharedProductRepository, SharedUserRepository, Store, UserRepository,
};
pub use seed::{SeedData, SeedReport};
pub use user::{Credentials, Identity, NewUser, PublicUser, Registration, User};
