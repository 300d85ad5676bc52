use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::config;
use crate::db::models::{Role, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User) -> Self {
        let now = Utc::now();
        let expiry_hours = config().security.jwt_expiry_hours;
        Self {
            sub: user.id,
            role: user.role,
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

pub fn sign_token(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    let secret = &config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::InvalidToken,
    })
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// A freshly minted password-reset token. The plain form goes to the
/// caller; only the hash is ever persisted.
#[derive(Debug)]
pub struct ResetToken {
    pub plain: String,
    pub hashed: String,
    pub expires_at: DateTime<Utc>,
}

pub fn generate_reset_token() -> ResetToken {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let plain = hex::encode(bytes);
    let hashed = hash_reset_token(&plain);
    let expiry_minutes = config().security.reset_token_expiry_minutes;
    ResetToken {
        plain,
        hashed,
        expires_at: Utc::now() + Duration::minutes(expiry_minutes as i64),
    }
}

pub fn hash_reset_token(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jo".to_string(),
            email: "jo@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Publisher,
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
            revision: 0,
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let user = sample_user();
        let token = sign_token(&Claims::new(&user)).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Publisher);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = sign_token(&Claims::new(&sample_user())).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token(&tampered).is_err());
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("123456").unwrap();
        assert!(verify_password("123456", &hash));
        assert!(!verify_password("654321", &hash));
    }

    #[test]
    fn reset_token_hash_is_deterministic_and_hides_plain() {
        let token = generate_reset_token();
        assert_ne!(token.plain, token.hashed);
        assert_eq!(hash_reset_token(&token.plain), token.hashed);
        assert!(token.expires_at > Utc::now());
    }
}
