//! # MongoDB Store
//!
//! `Store` implementation over four collections: `users`, `products`,
//! `coupons` and `orders`. Uniqueness of user emails and coupon codes is
//! enforced by unique indexes created at connect time.

use crate::config::MongoConfig;
use crate::documents::{CouponDocument, OrderDocument, ProductDocument, UserDocument};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, DateTime as BsonDateTime, Document};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};
use serde::de::DeserializeOwned;
use shop_core::{
    Coupon, CouponRepository, NewCoupon, NewOrder, NewUser, Order, OrderRepository, Product,
    ProductInput, ProductPatch, ProductRepository, Store, StoreError, StoreResult, User,
    UserRepository,
};
use tracing::{debug, info, instrument, warn};

/// Server error code for unique index violations
const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed store
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    users: Collection<UserDocument>,
    products: Collection<ProductDocument>,
    coupons: Collection<CouponDocument>,
    orders: Collection<OrderDocument>,
}

impl MongoStore {
    /// Connect, verify the server answers, and ensure indexes exist
    #[instrument(skip(config), fields(database = %config.database))]
    pub async fn connect(config: &MongoConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await.map_err(db_error)?;
        options.app_name = Some(config.app_name.clone());

        let client = Client::with_options(options).map_err(db_error)?;
        let db = client.database(&config.database);

        db.run_command(doc! { "ping": 1 }).await.map_err(db_error)?;
        info!("Connected to MongoDB at {}", config.redacted_uri());

        let store = Self {
            users: db.collection("users"),
            products: db.collection("products"),
            coupons: db.collection("coupons"),
            orders: db.collection("orders"),
            client,
        };
        store.ensure_indexes().await?;

        Ok(store)
    }

    /// Create connection from environment variables
    pub async fn from_env() -> StoreResult<Self> {
        let config = MongoConfig::from_env()?;
        Self::connect(&config).await
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        let unique = IndexOptions::builder().unique(true).build();

        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await
            .map_err(db_error)?;

        self.coupons
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "code": 1 })
                    .options(unique)
                    .build(),
            )
            .await
            .map_err(db_error)?;

        self.orders
            .create_index(IndexModel::builder().keys(doc! { "user": 1 }).build())
            .await
            .map_err(db_error)?;

        debug!("MongoDB indexes ensured");
        Ok(())
    }

    /// Close the connection pool. Call once the server has stopped accepting requests.
    pub async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB connection pool closed");
    }
}

fn db_error(err: MongoError) -> StoreError {
    StoreError::Database(err.to_string())
}

/// Whether the server refused a write because of a unique index
fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn insert_error(err: MongoError, field: &'static str) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::Duplicate { field }
    } else {
        db_error(err)
    }
}

/// Ids arrive as hex strings; anything else cannot match a document
fn object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

async fn collect<T, U>(collection: &Collection<T>, filter: Document) -> StoreResult<Vec<U>>
where
    T: DeserializeOwned + Send + Sync + Unpin,
    U: From<T>,
{
    let cursor = collection.find(filter).await.map_err(db_error)?;
    let docs: Vec<T> = cursor.try_collect().await.map_err(db_error)?;
    Ok(docs.into_iter().map(U::from).collect())
}

#[async_trait]
impl UserRepository for MongoStore {
    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut doc = UserDocument::from(user);
        let result = self
            .users
            .insert_one(&doc)
            .await
            .map_err(|e| insert_error(e, "email"))?;
        doc.id = result.inserted_id.as_object_id();
        Ok(doc.into())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let doc = self
            .users
            .find_one(doc! { "email": email })
            .await
            .map_err(db_error)?;
        Ok(doc.map(Into::into))
    }
}

#[async_trait]
impl ProductRepository for MongoStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        collect(&self.products, doc! {}).await
    }

    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let Some(oid) = object_id(id) else {
            return Ok(None);
        };
        let doc = self
            .products
            .find_one(doc! { "_id": oid })
            .await
            .map_err(db_error)?;
        Ok(doc.map(Into::into))
    }

    async fn insert_product(&self, input: ProductInput) -> StoreResult<Product> {
        let mut doc = ProductDocument::from(input);
        let result = self.products.insert_one(&doc).await.map_err(db_error)?;
        doc.id = result.inserted_id.as_object_id();
        Ok(doc.into())
    }

    #[instrument(skip(self, patch))]
    async fn update_product(&self, id: &str, patch: ProductPatch) -> StoreResult<Option<Product>> {
        let Some(oid) = object_id(id) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return self.get_product(id).await;
        }

        let set = bson::to_document(&patch).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let doc = self
            .products
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(db_error)?;
        Ok(doc.map(Into::into))
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        if let Some(oid) = object_id(id) {
            self.products
                .delete_one(doc! { "_id": oid })
                .await
                .map_err(db_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CouponRepository for MongoStore {
    async fn list_active_coupons(&self, now: DateTime<Utc>) -> StoreResult<Vec<Coupon>> {
        let filter = doc! {
            "enabled": true,
            "$or": [
                { "expiry": null },
                { "expiry": { "$gte": BsonDateTime::from_chrono(now) } }
            ]
        };
        collect(&self.coupons, filter).await
    }

    async fn find_enabled_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
        let doc = self
            .coupons
            .find_one(doc! { "code": code, "enabled": true })
            .await
            .map_err(db_error)?;
        Ok(doc.map(Into::into))
    }

    async fn insert_coupon(&self, coupon: NewCoupon) -> StoreResult<Coupon> {
        let mut doc = CouponDocument::from(coupon);
        let result = self
            .coupons
            .insert_one(&doc)
            .await
            .map_err(|e| insert_error(e, "code"))?;
        doc.id = result.inserted_id.as_object_id();
        Ok(doc.into())
    }
}

#[async_trait]
impl OrderRepository for MongoStore {
    #[instrument(skip(self, order))]
    async fn insert_order(
        &self,
        user_id: &str,
        order: NewOrder,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Order> {
        let user = object_id(user_id).ok_or_else(|| {
            warn!("Order placed with non-ObjectId user id");
            StoreError::InvalidRequest("Unknown user".to_string())
        })?;

        let mut doc = OrderDocument::place(user, order, created_at);
        let result = self.orders.insert_one(&doc).await.map_err(db_error)?;
        doc.id = result.inserted_id.as_object_id();
        Ok(doc.into())
    }

    async fn list_orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let Some(user) = object_id(user_id) else {
            return Ok(Vec::new());
        };
        collect(&self.orders, doc! { "user": user }).await
    }

    async fn delete_order_for_user(&self, id: &str, user_id: &str) -> StoreResult<bool> {
        let (Some(oid), Some(user)) = (object_id(id), object_id(user_id)) else {
            return Ok(false);
        };
        let result = self
            .orders
            .delete_one(doc! { "_id": oid, "user": user })
            .await
            .map_err(db_error)?;
        Ok(result.deleted_count > 0)
    }
}

impl Store for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_parsing() {
        let oid = ObjectId::new();
        assert_eq!(object_id(&oid.to_hex()), Some(oid));
        assert_eq!(object_id("not-an-id"), None);
        assert_eq!(object_id(""), None);
    }

    #[test]
    fn test_patch_becomes_partial_set() {
        let patch = ProductPatch {
            price: Some(19.5),
            category: Some("cables".to_string()),
            ..Default::default()
        };
        let set = bson::to_document(&patch).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get_f64("price").unwrap(), 19.5);
        assert!(!set.contains_key("name"));
    }
}
