//! # User Types
//!
//! Accounts, their public projection, and the identity carried by session tokens.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// A stored account. `password` holds the bcrypt hash, never plaintext.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    /// Fields safe to return to the caller
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// A user record ready to be persisted (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// User fields exposed by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
}

/// The authenticated caller, decoded from a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Body of `POST /api/auth/register`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidRequest("Name cannot be empty".to_string()));
        }
        if !self.email.contains('@') {
            return Err(StoreError::InvalidRequest("Invalid email address".to_string()));
        }
        if self.password.is_empty() {
            return Err(StoreError::InvalidRequest("Password cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
