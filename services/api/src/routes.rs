//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{NewRoom, UpdateRoom},
    state::AppState,
};

/// Collection of the current user's rooms
pub const ROOMS_PATH: &str = "/api/users/me/rooms";
/// A single room of the current user
pub const ROOM_PATH: &str = "/api/users/me/rooms/:id";

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(ROOMS_PATH, get(get_current_user_rooms).post(create_room))
        .route(
            ROOM_PATH,
            get(get_room).put(update_room).delete(delete_room),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Create a room owned by the current user
pub async fn create_room(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewRoom>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(new_room) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let created = state.room_service.create_room(&user, new_room).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// List the current user's rooms
pub async fn get_current_user_rooms(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let rooms = state.room_service.get_current_user_rooms(&user).await?;

    Ok(Json(rooms))
}

/// Get one of the current user's rooms
pub async fn get_room(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let room = state.room_service.get_room(&user, &id).await?;

    Ok(Json(room))
}

/// Update one of the current user's rooms
pub async fn update_room(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRoom>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state.room_service.update_room(&user, &id, form).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete one of the current user's rooms
pub async fn delete_room(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.room_service.delete_room(&user, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
