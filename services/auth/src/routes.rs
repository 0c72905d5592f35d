//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::{
    error::DatabaseError,
    token::{Claims, TokenType},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::AuthError,
    middleware::auth_middleware,
    models::{LoginCredentials, NewUser, User, UserProfile},
    repositories::user::verify_password,
    state::AppState,
    validation::{validate_password, validate_username},
};

/// Response for token generation
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request carrying a refresh token
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for user registration
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn internal_error(context: &'static str) -> impl FnOnce(anyhow::Error) -> AuthError {
    move |e| {
        error!("{}: {}", context, e);
        AuthError::InternalServerError
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(new_user) = payload.map_err(|e| AuthError::BadRequest(e.body_text()))?;
    info!("Registration request for user: {}", new_user.username);

    validate_username(&new_user.username).map_err(AuthError::BadRequest)?;
    validate_password(&new_user.password).map_err(AuthError::BadRequest)?;

    let user = match state.user_repository.create(&new_user).await {
        Ok(user) => user,
        Err(e)
            if e
                .downcast_ref::<DatabaseError>()
                .is_some_and(DatabaseError::is_unique_violation) =>
        {
            return Err(AuthError::Conflict(format!(
                "Username {} is already taken",
                new_user.username
            )));
        }
        Err(e) => return Err(internal_error("Failed to create user")(e)),
    };

    Ok((StatusCode::CREATED, Json(RegisterResponse { id: user.id })))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(credentials) = payload.map_err(|e| AuthError::BadRequest(e.body_text()))?;
    info!("Login attempt for user: {}", credentials.username);

    let allowed = state
        .rate_limiter
        .is_allowed(&credentials.username)
        .await
        .map_err(internal_error("Failed to check rate limit"))?;

    if !allowed {
        warn!("Rate limit exceeded for user: {}", credentials.username);
        return Err(AuthError::TooManyRequests);
    }

    let user = state
        .user_repository
        .find_by_username(&credentials.username)
        .await
        .map_err(internal_error("Failed to look up user"))?;

    let Some(user) = user else {
        warn!("Login for unknown user: {}", credentials.username);
        return Err(AuthError::Unauthorized);
    };

    let password_matches = verify_password(&user, &credentials.password)
        .map_err(internal_error("Failed to verify password"))?;

    if !password_matches {
        warn!("Invalid password for user: {}", credentials.username);
        return Err(AuthError::Unauthorized);
    }

    state.rate_limiter.reset(&credentials.username).await;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(&user)
        .map_err(internal_error("Failed to generate refresh token"))?;

    state
        .session_manager
        .create_session(user.id, &refresh_token)
        .await
        .map_err(internal_error("Failed to store session"))?;

    issue_tokens(&state, &user, refresh_token)
}

/// Refresh token endpoint
///
/// The presented refresh token is revoked and replaced; replaying it fails.
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| AuthError::BadRequest(e.body_text()))?;
    info!("Token refresh request");

    let claims = verified_refresh_claims(&state, &payload.refresh_token).await?;

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(internal_error("Failed to look up user"))?
        .ok_or(AuthError::Unauthorized)?;

    let new_refresh_token = state
        .jwt_service
        .generate_refresh_token(&user)
        .map_err(internal_error("Failed to generate refresh token"))?;

    let rotated = state
        .session_manager
        .rotate_session(user.id, &payload.refresh_token, &new_refresh_token)
        .await
        .map_err(internal_error("Failed to rotate session"))?;

    if !rotated {
        warn!("Refresh token is not the current session for user: {}", claims.sub);
        return Err(AuthError::Unauthorized);
    }

    state
        .revocations
        .revoke(&claims)
        .await
        .map_err(internal_error("Failed to revoke refresh token"))?;

    issue_tokens(&state, &user, new_refresh_token)
}

/// Logout endpoint
///
/// Revokes the refresh token and ends the session. An access token sent
/// alongside as a bearer token is revoked too.
pub async fn logout(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| AuthError::BadRequest(e.body_text()))?;
    info!("Logout request");

    let claims = verified_refresh_claims(&state, &payload.refresh_token).await?;

    state
        .revocations
        .revoke(&claims)
        .await
        .map_err(internal_error("Failed to revoke refresh token"))?;

    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        if let Ok(access_claims) = state
            .jwt_service
            .validate_token(bearer.token(), TokenType::Access)
        {
            state
                .revocations
                .revoke(&access_claims)
                .await
                .map_err(internal_error("Failed to revoke access token"))?;
        }
    }

    state
        .session_manager
        .delete_session(claims.sub)
        .await
        .map_err(internal_error("Failed to remove session"))?;

    Ok((
        StatusCode::OK,
        Json(json!({"message": "Logged out successfully"})),
    ))
}

/// Profile of the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(internal_error("Failed to look up user"))?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(UserProfile::from(&user)))
}

async fn verified_refresh_claims(state: &AppState, token: &str) -> Result<Claims, AuthError> {
    let claims = state
        .jwt_service
        .validate_token(token, TokenType::Refresh)
        .map_err(|e| {
            warn!("Rejected refresh token: {}", e);
            AuthError::Unauthorized
        })?;

    let is_revoked = state
        .revocations
        .is_revoked(&claims)
        .await
        .map_err(internal_error("Failed to check token revocation"))?;

    if is_revoked {
        warn!("Revoked refresh token presented for user: {}", claims.sub);
        return Err(AuthError::Unauthorized);
    }

    Ok(claims)
}

fn issue_tokens(
    state: &AppState,
    user: &User,
    refresh_token: String,
) -> Result<Json<TokenResponse>, AuthError> {
    let access_token = state
        .jwt_service
        .generate_access_token(user)
        .map_err(internal_error("Failed to generate access token"))?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}
