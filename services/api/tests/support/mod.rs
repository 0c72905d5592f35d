#![allow(dead_code)]

use std::sync::Arc;

use api::{
    repositories::InMemoryRoomRepository, routes::create_router, service::RoomService,
    state::AppState,
};
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use common::{
    revocation::InMemoryRevocationList,
    role::{Role, RoleSet},
    token::{Claims, TokenType, TokenVerifier},
};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use tower::ServiceExt;
use uuid::Uuid;

const PRIVATE_KEY: &str = include_str!("../../../../fixtures/jwt/private.pem");
const PUBLIC_KEY: &str = include_str!("../../../../fixtures/jwt/public.pem");

/// Build the application router backed by an in-memory room store.
pub fn build_test_app() -> Router {
    build_test_app_with_revocations(InMemoryRevocationList::new())
}

/// Build the application router sharing `revocations` with the caller.
pub fn build_test_app_with_revocations(revocations: InMemoryRevocationList) -> Router {
    let state = AppState {
        room_service: RoomService::new(Arc::new(InMemoryRoomRepository::new())),
        token_verifier: TokenVerifier::from_rsa_pem(PUBLIC_KEY).expect("fixture public key"),
        revocations: Arc::new(revocations),
    };
    create_router(state)
}

/// Claims for `user_id` shaped like the ones the auth service issues.
pub fn claims_for(user_id: Uuid, token_type: TokenType, lifetime_secs: i64) -> Claims {
    let now = get_current_timestamp();
    Claims {
        sub: user_id,
        username: "user".to_string(),
        roles: [Role::User].into_iter().collect::<RoleSet>(),
        iat: now,
        exp: now.saturating_add_signed(lifetime_secs),
        token_type,
        jti: Uuid::new_v4(),
    }
}

/// Sign `claims` with the fixture private key.
pub fn sign(claims: &Claims) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).expect("fixture private key");
    encode(&Header::new(Algorithm::RS256), claims, &key).expect("token signing")
}

/// Sign a token for `user_id` the way the auth service does.
pub fn sign_token(user_id: Uuid, token_type: TokenType, lifetime_secs: i64) -> String {
    sign(&claims_for(user_id, token_type, lifetime_secs))
}

/// A valid access token for `user_id`.
pub fn access_token(user_id: Uuid) -> String {
    sign_token(user_id, TokenType::Access, 900)
}

pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "DELETE", uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}
