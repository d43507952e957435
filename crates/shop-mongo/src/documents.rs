//! # Stored Documents
//!
//! BSON shapes of each collection and their conversion to `shop-core` types.
//! Ids are ObjectIds in the database and hex strings everywhere else.

use bson::oid::ObjectId;
use bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use shop_core::{
    Coupon, CouponType, NewCoupon, NewOrder, NewUser, Order, OrderItem, Product, ProductInput,
    ProductSnapshot, User,
};

fn hex(id: Option<ObjectId>) -> String {
    id.map(|oid| oid.to_hex()).unwrap_or_default()
}

fn default_true() -> bool {
    true
}

/// `users` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
}

impl From<NewUser> for UserDocument {
    fn from(user: NewUser) -> Self {
        Self {
            id: None,
            name: user.name,
            email: user.email,
            password: user.password_hash,
        }
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: hex(doc.id),
            name: doc.name,
            email: doc.email,
            password: doc.password,
        }
    }
}

/// `products` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
}

impl From<ProductInput> for ProductDocument {
    fn from(input: ProductInput) -> Self {
        Self {
            id: None,
            name: input.name,
            desc: input.desc,
            price: input.price,
            images: input.images,
            category: input.category,
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        Self {
            id: hex(doc.id),
            name: doc.name,
            desc: doc.desc,
            price: doc.price,
            images: doc.images,
            category: doc.category,
        }
    }
}

/// `coupons` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type", default)]
    pub kind: CouponType,
    #[serde(default)]
    pub amount: f64,
    #[serde(rename = "minOrder", default, skip_serializing_if = "Option::is_none")]
    pub min_order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<BsonDateTime>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl From<NewCoupon> for CouponDocument {
    fn from(coupon: NewCoupon) -> Self {
        Self {
            id: None,
            code: coupon.code,
            desc: coupon.desc,
            kind: coupon.kind,
            amount: coupon.amount,
            min_order: coupon.min_order,
            expiry: coupon.expiry.map(BsonDateTime::from_chrono),
            enabled: coupon.enabled,
        }
    }
}

impl From<CouponDocument> for Coupon {
    fn from(doc: CouponDocument) -> Self {
        Self {
            id: hex(doc.id),
            code: doc.code,
            desc: doc.desc,
            kind: doc.kind,
            amount: doc.amount,
            min_order: doc.min_order,
            expiry: doc.expiry.map(BsonDateTime::to_chrono),
            enabled: doc.enabled,
        }
    }
}

/// Embedded product copy inside an order line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDocument {
    pub product: SnapshotDocument,
    pub qty: u32,
}

impl From<OrderItem> for OrderItemDocument {
    fn from(item: OrderItem) -> Self {
        let p = item.product;
        Self {
            product: SnapshotDocument {
                id: p.id,
                name: p.name,
                desc: p.desc,
                price: p.price,
                images: p.images,
                category: p.category,
            },
            qty: item.qty,
        }
    }
}

impl From<OrderItemDocument> for OrderItem {
    fn from(doc: OrderItemDocument) -> Self {
        let p = doc.product;
        Self {
            product: ProductSnapshot {
                id: p.id,
                name: p.name,
                desc: p.desc,
                price: p.price,
                images: p.images,
                category: p.category,
            },
            qty: doc.qty,
        }
    }
}

/// `orders` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Owning user's `_id`
    pub user: ObjectId,
    #[serde(default)]
    pub items: Vec<OrderItemDocument>,
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
}

impl OrderDocument {
    pub fn place(user: ObjectId, order: NewOrder, created_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            id: None,
            user,
            items: order.items.into_iter().map(Into::into).collect(),
            total: order.total,
            coupon: order.coupon,
            created_at: BsonDateTime::from_chrono(created_at),
        }
    }
}

impl From<OrderDocument> for Order {
    fn from(doc: OrderDocument) -> Self {
        Self {
            id: hex(doc.id),
            user: doc.user.to_hex(),
            items: doc.items.into_iter().map(Into::into).collect(),
            total: doc.total,
            coupon: doc.coupon,
            created_at: doc.created_at.to_chrono(),
        }
    }
}
