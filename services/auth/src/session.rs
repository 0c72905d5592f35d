//! Session management using Redis
//!
//! A user holds at most one session: the refresh token issued by the most
//! recent login or refresh. Logging in again replaces it.

use anyhow::Result;
use common::cache::RedisPool;
use tracing::info;
use uuid::Uuid;

/// Session manager for handling user sessions in Redis
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    session_ttl: u64,
}

impl SessionManager {
    /// Create a new session manager; sessions expire after `session_ttl` seconds
    pub fn new(redis_pool: RedisPool, session_ttl: u64) -> Self {
        Self {
            redis_pool,
            session_ttl,
        }
    }

    /// Store `refresh_token` as the user's current session
    pub async fn create_session(&self, user_id: Uuid, refresh_token: &str) -> Result<()> {
        info!("Creating session for user: {}", user_id);

        self.redis_pool
            .set(&session_key(user_id), refresh_token, Some(self.session_ttl))
            .await
    }

    /// Replace the session with `replacement` if `current` is still the
    /// user's session
    ///
    /// Returns false when `current` was superseded, logged out or already
    /// rotated by a concurrent request.
    pub async fn rotate_session(
        &self,
        user_id: Uuid,
        current: &str,
        replacement: &str,
    ) -> Result<bool> {
        self.redis_pool
            .compare_and_swap(&session_key(user_id), current, replacement, self.session_ttl)
            .await
    }

    /// Delete the user's session
    pub async fn delete_session(&self, user_id: Uuid) -> Result<()> {
        info!("Deleting session for user: {}", user_id);

        self.redis_pool.delete(&session_key(user_id)).await
    }
}

fn session_key(user_id: Uuid) -> String {
    format!("session:{}", user_id)
}
