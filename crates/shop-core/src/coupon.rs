//! # Coupon Rules
//!
//! Coupon records and the evaluation of a coupon against a cart.
//!
//! Evaluation order matters and is fixed:
//!
//! ```text
//! code + cart present ──► enabled coupon with code ──► not expired
//!        ──► subtotal ≥ minOrder ──► raw discount ──► clamp to subtotal
//! ```
//!
//! Any failing step rejects the coupon with a zero discount.

use crate::error::{StoreError, StoreResult};
use crate::repository::CouponRepository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a coupon's `amount` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    /// `amount` is subtracted as currency units
    #[default]
    Flat,
    /// `amount` is a percentage of the subtotal
    Percent,
    /// Any other stored value. Evaluates to a zero discount.
    #[serde(other)]
    Unrecognized,
}

/// A stored coupon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: String,

    /// Always uppercase
    pub code: String,

    #[serde(default)]
    pub desc: String,

    #[serde(rename = "type", default)]
    pub kind: CouponType,

    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_order: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Coupon {
    pub fn from_new(id: impl Into<String>, new: NewCoupon) -> Self {
        Self {
            id: id.into(),
            code: new.code,
            desc: new.desc,
            kind: new.kind,
            amount: new.amount,
            min_order: new.min_order,
            expiry: new.expiry,
            enabled: new.enabled,
        }
    }

    /// Whether the coupon has an expiry that lies before `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry < now)
    }

    /// Listed coupons are enabled and not yet expired
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.enabled && !self.is_expired(now)
    }

    /// Discount for a given subtotal, before any gating
    pub fn raw_discount(&self, subtotal: f64) -> f64 {
        match self.kind {
            CouponType::Flat => self.amount,
            CouponType::Percent => (subtotal * self.amount / 100.0).floor(),
            CouponType::Unrecognized => 0.0,
        }
    }

    /// Evaluate this coupon against a cart.
    ///
    /// The caller is responsible for the code lookup; this checks expiry and
    /// the minimum order, then returns the discount clamped to the subtotal.
    pub fn quote(&self, cart: &[CartLine], now: DateTime<Utc>) -> Result<CouponQuote, CouponRejection> {
        if self.is_expired(now) {
            return Err(CouponRejection::Expired);
        }

        let subtotal = subtotal(cart);

        if let Some(min_order) = self.min_order {
            if subtotal < min_order {
                return Err(CouponRejection::MinOrderNotReached);
            }
        }

        let discount = self.raw_discount(subtotal).min(subtotal);

        Ok(CouponQuote {
            code: self.code.clone(),
            desc: self.desc.clone(),
            discount,
            expires_at: self.expiry,
            kind: self.kind,
            amount: self.amount,
        })
    }
}

/// Body of `POST /api/coupons/create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCoupon {
    pub code: String,

    #[serde(default)]
    pub desc: String,

    #[serde(rename = "type", default)]
    pub kind: CouponType,

    pub amount: f64,

    #[serde(default)]
    pub min_order: Option<f64>,

    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl NewCoupon {
    /// Validate and uppercase the code
    pub fn normalized(mut self) -> StoreResult<Self> {
        self.code = self.code.trim().to_uppercase();

        if self.code.is_empty() {
            return Err(StoreError::InvalidRequest("Coupon code cannot be empty".to_string()));
        }
        if self.kind == CouponType::Unrecognized {
            return Err(StoreError::InvalidRequest(
                "Coupon type must be 'flat' or 'percent'".to_string(),
            ));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(StoreError::InvalidRequest(
                "Coupon amount must be a non-negative number".to_string(),
            ));
        }
        if self.min_order.is_some_and(|min| !min.is_finite() || min < 0.0) {
            return Err(StoreError::InvalidRequest(
                "Minimum order must be a non-negative number".to_string(),
            ));
        }

        Ok(self)
    }
}

/// One line of the cart sent to `POST /api/coupons/apply`.
///
/// Clients send whole product objects here; only `price` and `qty` are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub price: f64,
    pub qty: u32,
}

/// Sum of `price × qty` over the cart
pub fn subtotal(cart: &[CartLine]) -> f64 {
    cart.iter().map(|line| line.price * f64::from(line.qty)).sum()
}

/// Body of `POST /api/coupons/apply`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyCoupon {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub cart: Option<Vec<CartLine>>,
}

/// Successful evaluation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponQuote {
    pub code: String,
    pub desc: String,
    pub discount: f64,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: CouponType,
    pub amount: f64,
}

/// Why a coupon was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    MissingInput,
    InvalidCode,
    Expired,
    MinOrderNotReached,
}

impl CouponRejection {
    /// Message shown to the client
    pub fn message(&self) -> &'static str {
        match self {
            CouponRejection::MissingInput => "No code or cart sent",
            CouponRejection::InvalidCode => "Invalid coupon",
            CouponRejection::Expired => "Coupon expired",
            CouponRejection::MinOrderNotReached => "Min order not reached.",
        }
    }
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Look up the coupon named in `request` and evaluate it against its cart.
pub async fn apply(
    coupons: &dyn CouponRepository,
    request: ApplyCoupon,
    now: DateTime<Utc>,
) -> StoreResult<CouponQuote> {
    let code = request
        .code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
        .ok_or(CouponRejection::MissingInput)?;
    let cart = request
        .cart
        .filter(|cart| !cart.is_empty())
        .ok_or(CouponRejection::MissingInput)?;

    let coupon = coupons
        .find_enabled_by_code(&code.to_uppercase())
        .await?
        .ok_or(CouponRejection::InvalidCode)?;

    Ok(coupon.quote(&cart, now)?)
}
