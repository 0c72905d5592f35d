//! Application state shared across handlers

use std::sync::Arc;

use common::{revocation::RevocationList, token::TokenVerifier};

use crate::service::RoomService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub room_service: RoomService,
    pub token_verifier: TokenVerifier,
    /// Tokens revoked by the auth service
    pub revocations: Arc<dyn RevocationList>,
}
