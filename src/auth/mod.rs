pub mod denylist;
pub mod password;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use denylist::{DenylistError, MemoryTokenDenylist, PgTokenDenylist, TokenDenylist};
pub use password::{hash_password, verify_password, PasswordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    fn lifetime_secs(&self, security: &SecurityConfig) -> u64 {
        match self {
            TokenKind::Access => security.access_token_expires,
            TokenKind::Refresh => security.refresh_token_expires,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub jti: Uuid,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, kind: TokenKind, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::seconds(kind.lifetime_secs(security) as i64)).timestamp();

        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4(),
            kind,
            iat: now.timestamp(),
            exp,
        }
    }

    pub fn user_id(&self) -> Result<i32, JwtError> {
        self.sub.parse().map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Expected {expected} token, got {actual}")]
    WrongKind { expected: &'static str, actual: &'static str },

    #[error("Invalid token subject: {0}")]
    InvalidSubject(String),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Body returned by the login endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

pub fn issue_token(user_id: i32, kind: TokenKind, security: &SecurityConfig) -> Result<IssuedToken, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(user_id, kind, security);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    let token = encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))?;

    Ok(IssuedToken { token, claims })
}

pub fn issue_token_pair(user_id: i32, security: &SecurityConfig) -> Result<TokenPair, JwtError> {
    let access = issue_token(user_id, TokenKind::Access, security)?;
    let refresh = issue_token(user_id, TokenKind::Refresh, security)?;
    Ok(TokenPair {
        access_token: access.token,
        refresh_token: refresh.token,
        token_type: "bearer",
        expires_in: security.access_token_expires,
    })
}

/// Verify signature and expiry, then require the expected token kind.
pub fn decode_token(token: &str, expected: TokenKind, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let claims = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })?
        .claims;

    if claims.kind != expected {
        return Err(JwtError::WrongKind {
            expected: expected.as_str(),
            actual: claims.kind.as_str(),
        });
    }
    claims.user_id()?;

    Ok(claims)
}
