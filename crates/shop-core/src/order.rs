//! # Order Types
//!
//! Orders embed a copy of each product as it looked at checkout, so later
//! catalog edits never rewrite order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product fields captured into an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSnapshot {
    /// Catalog id at checkout time, if the client sent one
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub desc: String,

    pub price: f64,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub category: String,
}

/// A line item in an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItem {
    pub product: ProductSnapshot,
    pub qty: u32,
}

impl OrderItem {
    /// Price of this line at checkout
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.qty)
    }
}

/// Body of `POST /api/orders`.
///
/// Stored as sent: `total` and `coupon` are not re-derived from the items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewOrder {
    #[serde(default)]
    pub items: Vec<OrderItem>,

    pub total: f64,

    #[serde(default)]
    pub coupon: Option<String>,
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning user id
    pub user: String,

    pub items: Vec<OrderItem>,

    pub total: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Stamp a submitted order with its owner and creation time
    pub fn place(
        id: impl Into<String>,
        user: impl Into<String>,
        new: NewOrder,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user: user.into(),
            items: new.items,
            total: new.total,
            coupon: new.coupon,
            created_at,
        }
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.qty).sum()
    }

    /// Sum of line totals, independent of the submitted `total`
    pub fn items_subtotal(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}
