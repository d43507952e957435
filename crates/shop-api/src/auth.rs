//! # Authentication
//!
//! Session tokens (HS256 JWTs carrying `{id, name, email}`), bcrypt password
//! hashing, and the middleware guarding protected routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shop_core::{Identity, StoreError, StoreResult, User};
use tracing::{debug, warn};

pub const NO_TOKEN: &str = "No token";
pub const INVALID_TOKEN: &str = "Wrong or expired token";

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub name: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            id: claims.id,
            name: claims.name,
            email: claims.email,
        }
    }
}

/// Issues and verifies session tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        // Expired means expired: no grace period past `exp`
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Token for a freshly authenticated user, valid for the configured TTL
    pub fn issue(&self, user: &User) -> StoreResult<String> {
        self.issue_for(&user.identity(), Utc::now())
    }

    /// Token for `identity` as if issued at `issued_at`
    pub fn issue_for(&self, identity: &Identity, issued_at: DateTime<Utc>) -> StoreResult<String> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| StoreError::Token("Failed to calculate expiration".to_string()))?;

        let claims = Claims {
            id: identity.id.clone(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| StoreError::Token(format!("Token generation failed: {}", e)))
    }

    /// Check signature and expiry; any failure is the same generic `Unauthorized`
    pub fn verify(&self, token: &str) -> StoreResult<Identity> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| {
                debug!("Rejected session token: {}", e);
                StoreError::Unauthorized(INVALID_TOKEN.to_string())
            })
    }
}

/// bcrypt-hash a password on the blocking pool
pub async fn hash_password(password: String, cost: u32) -> StoreResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| StoreError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| StoreError::PasswordHash(e.to_string()))
}

/// Compare a password against a stored bcrypt hash on the blocking pool.
///
/// A stored value that is not a bcrypt hash never matches.
pub async fn verify_password(password: String, hash: String) -> StoreResult<bool> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| StoreError::Internal(format!("Hashing task failed: {}", e)))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            Ok(false)
        }
    }
}

/// Require `Authorization: Bearer <token>` and attach the caller's `Identity`
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized(NO_TOKEN))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?;

    let identity = state.tokens.verify(token)?;
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Identity {
        Identity {
            id: "65f1a2b3c4d5e6f708192a3b".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = TokenService::new("test-secret", Duration::hours(2));
        let token = tokens.issue_for(&ada(), Utc::now()).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), ada());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let ours = TokenService::new("test-secret", Duration::hours(2));
        let theirs = TokenService::new("another-secret", Duration::hours(2));
        let token = theirs.issue_for(&ada(), Utc::now()).unwrap();

        let err = ours.verify(&token).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized(ref msg) if msg == INVALID_TOKEN));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("test-secret", Duration::hours(2));
        let token = tokens
            .issue_for(&ada(), Utc::now() - Duration::hours(3))
            .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_token_rejected_just_after_expiry() {
        let tokens = TokenService::new("test-secret", Duration::hours(2));
        let issued_at = Utc::now() - tokens.ttl() - Duration::seconds(5);
        let token = tokens.issue_for(&ada(), issued_at).unwrap();

        let err = tokens.verify(&token).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized(ref msg) if msg == INVALID_TOKEN));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = TokenService::new("test-secret", Duration::hours(2));
        assert!(tokens.verify("not.a.jwt").is_err());
        assert!(tokens.verify("").is_err());
    }

    #[test]
    fn test_claims_expire_after_ttl() {
        let tokens = TokenService::new("test-secret", Duration::hours(2));
        let issued_at = Utc::now();
        let token = tokens.issue_for(&ada(), issued_at).unwrap();

        let claims = decode::<Claims>(&token, &tokens.decoding, &tokens.validation)
            .unwrap()
            .claims;
        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse".to_string(), 4).await.unwrap();

        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("battery staple".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_hash_never_matches() {
        let matches = verify_password("anything".to_string(), "plaintext".to_string())
            .await
            .unwrap();
        assert!(!matches);
    }
}
