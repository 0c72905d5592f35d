//! Middleware for JWT token validation and authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::token::TokenType;
use tracing::{error, warn};

use crate::{error::AuthError, state::AppState};

/// Require a valid, unrevoked access token
///
/// The token's claims are stored as a request extension for the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token(bearer.token(), TokenType::Access)
        .map_err(|e| {
            warn!("Rejected bearer token: {}", e);
            AuthError::Unauthorized
        })?;

    let is_revoked = state.revocations.is_revoked(&claims).await.map_err(|e| {
        error!("Failed to check token revocation: {}", e);
        AuthError::InternalServerError
    })?;

    if is_revoked {
        warn!("Revoked access token presented for user: {}", claims.sub);
        return Err(AuthError::Unauthorized);
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
