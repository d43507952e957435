//! # Seed Data
//!
//! Initial products and coupons loaded from a TOML file at startup.
//!
//! ```toml
//! [[products]]
//! name = "ThinkPad X1"
//! price = 1499.0
//! category = "laptops"
//!
//! [[coupons]]
//! code = "welcome10"
//! type = "percent"
//! amount = 10
//! expiry = "2030-01-01T00:00:00Z"
//! ```

use crate::coupon::NewCoupon;
use crate::error::{StoreError, StoreResult};
use crate::product::ProductInput;
use crate::repository::Repositories;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub products: Vec<ProductInput>,
    #[serde(default)]
    pub coupons: Vec<NewCoupon>,
}

/// What a seed run actually inserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub products: usize,
    pub coupons: usize,
}

impl SeedData {
    pub fn from_toml(toml_str: &str) -> StoreResult<Self> {
        toml::from_str(toml_str).map_err(|e| StoreError::Configuration(format!("Invalid seed file: {}", e)))
    }

    pub fn from_file(path: &str) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Configuration(format!("Failed to read {}: {}", path, e)))?;
        Self::from_toml(&content)
    }

    /// Insert products into an empty catalog and any coupons whose code is new.
    pub async fn apply(self, repos: &Repositories) -> StoreResult<SeedReport> {
        let mut report = SeedReport::default();

        if repos.products.list_products().await?.is_empty() {
            for product in self.products {
                product.validate()?;
                repos.products.insert_product(product).await?;
                report.products += 1;
            }
        } else {
            info!("Catalog already populated, skipping seed products");
        }

        for coupon in self.coupons {
            let coupon = coupon.normalized()?;
            let code = coupon.code.clone();
            match repos.coupons.insert_coupon(coupon).await {
                Ok(_) => report.coupons += 1,
                Err(StoreError::Duplicate { .. }) => info!("Seed coupon {} already exists", code),
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }
}
