//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::{
    role::RoleSet,
    token::{Claims, TokenType},
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub roles: RoleSet,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

/// Authentication middleware
///
/// Rejects the request with 401 unless it carries a valid access token that
/// the auth service has not revoked, and otherwise stores the caller as an [`AuthUser`] request extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let claims = state
        .token_verifier
        .verify_as(bearer.token(), TokenType::Access)
        .map_err(|e| {
            warn!("Rejected bearer token: {}", e);
            ApiError::Unauthorized
        })?;

    let is_revoked = state.revocations.is_revoked(&claims).await.map_err(|e| {
        error!("Failed to check token revocation: {}", e);
        ApiError::InternalServerError
    })?;

    if is_revoked {
        warn!("Revoked access token presented for user: {}", claims.sub);
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(req).await)
}
