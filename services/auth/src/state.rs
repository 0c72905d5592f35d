//! Application state shared across handlers

use common::revocation::RevocationList;
use std::sync::Arc;

use crate::{
    jwt::JwtService, rate_limiter::RateLimiter, repositories::UserRepository,
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: UserRepository,
    pub session_manager: SessionManager,
    pub revocations: Arc<dyn RevocationList>,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
}
