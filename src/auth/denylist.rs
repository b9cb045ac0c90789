use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Claims;

#[derive(Debug, Error)]
pub enum DenylistError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Store of revoked token ids. An entry only needs to outlive the token it
/// revokes, so implementations may forget it once `expires_at` has passed.
#[async_trait]
pub trait TokenDenylist: Send + Sync {
    async fn revoke(&self, claims: &Claims) -> Result<(), DenylistError>;

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, DenylistError>;

    /// Drop entries whose token has expired; returns how many were removed.
    async fn purge_expired(&self) -> Result<u64, DenylistError>;
}

pub struct PgTokenDenylist {
    pool: PgPool,
}

impl PgTokenDenylist {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenDenylist for PgTokenDenylist {
    async fn revoke(&self, claims: &Claims) -> Result<(), DenylistError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, token_type, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(claims.jti)
        .bind(claims.kind.as_str())
        .bind(claims.expires_at())
        .execute(&self.pool)
        .await?;

        tracing::debug!("Revoked {} token {}", claims.kind.as_str(), claims.jti);
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, DenylistError> {
        let revoked: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1 AND expires_at > now())",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await?;

        Ok(revoked.0)
    }

    async fn purge_expired(&self) -> Result<u64, DenylistError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// In-process denylist for tests and single-node tooling
#[derive(Default)]
pub struct MemoryTokenDenylist {
    entries: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl MemoryTokenDenylist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenDenylist for MemoryTokenDenylist {
    async fn revoke(&self, claims: &Claims) -> Result<(), DenylistError> {
        self.entries.write().await.insert(claims.jti, claims.expires_at());
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, DenylistError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&jti).is_some_and(|expires_at| *expires_at > Utc::now()))
    }

    async fn purge_expired(&self) -> Result<u64, DenylistError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
