//! # Product Types
//!
//! Catalog records and the validated inputs used to create and patch them.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub desc: String,

    /// Unit price
    pub price: f64,

    /// Image references (URLs or asset keys)
    #[serde(default)]
    pub images: Vec<String>,

    /// Category label
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// Build a stored product from a validated input and an assigned id
    pub fn from_input(id: impl Into<String>, input: ProductInput) -> Self {
        Self {
            id: id.into(),
            name: input.name,
            desc: input.desc,
            price: input.price,
            images: input.images,
            category: input.category,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(desc) = patch.desc {
            self.desc = desc;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }
}

/// Body of `POST /api/products`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
}

impl ProductInput {
    pub fn validate(&self) -> StoreResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }
}

/// Body of `PUT /api/products/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductPatch {
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.desc.is_none()
            && self.price.is_none()
            && self.images.is_none()
            && self.category.is_none()
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidRequest(
            "Product name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: f64) -> StoreResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(StoreError::InvalidRequest(
            "Product price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}
