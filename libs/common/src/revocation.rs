//! Revoked token list
//!
//! Tokens are revoked by `jti`. An entry lives as long as the token could
//! still pass validation, which is its remaining lifetime plus the
//! verifier's leeway.

use anyhow::Result;
use async_trait::async_trait;
use jsonwebtoken::get_current_timestamp;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    cache::RedisPool,
    token::{Claims, VALIDATION_LEEWAY_SECS},
};

/// Store of revoked token ids shared by every service that accepts tokens
#[async_trait]
pub trait RevocationList: Send + Sync {
    /// Revoke the token described by `claims`
    async fn revoke(&self, claims: &Claims) -> Result<()>;

    /// Whether the token described by `claims` was revoked
    async fn is_revoked(&self, claims: &Claims) -> Result<bool>;
}

/// Seconds a revocation has to be remembered, measured from `now`
pub fn revocation_ttl(claims: &Claims, now: u64) -> u64 {
    claims.exp.saturating_sub(now) + VALIDATION_LEEWAY_SECS
}

fn revoked_key(jti: Uuid) -> String {
    format!("revoked_token:{}", jti)
}

#[async_trait]
impl RevocationList for RedisPool {
    async fn revoke(&self, claims: &Claims) -> Result<()> {
        let ttl = revocation_ttl(claims, get_current_timestamp());
        self.set(&revoked_key(claims.jti), "1", Some(ttl)).await
    }

    async fn is_revoked(&self, claims: &Claims) -> Result<bool> {
        self.exists(&revoked_key(claims.jti)).await
    }
}

/// Process-local revocation list
///
/// Maps each revoked `jti` to the timestamp after which it can be forgotten.
#[derive(Clone, Default)]
pub struct InMemoryRevocationList {
    revoked: Arc<RwLock<HashMap<Uuid, u64>>>,
}

impl InMemoryRevocationList {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationList for InMemoryRevocationList {
    async fn revoke(&self, claims: &Claims) -> Result<()> {
        let now = get_current_timestamp();
        let mut revoked = self.revoked.write().await;

        revoked.retain(|_, forget_at| *forget_at > now);
        revoked.insert(claims.jti, now + revocation_ttl(claims, now));

        Ok(())
    }

    async fn is_revoked(&self, claims: &Claims) -> Result<bool> {
        let now = get_current_timestamp();
        let revoked = self.revoked.read().await;

        Ok(revoked
            .get(&claims.jti)
            .is_some_and(|forget_at| *forget_at > now))
    }
}
