//! HTTP-level integration tests for the room endpoints.
//!
//! Tests cover bearer authentication, the create/list/get/update/delete
//! cycle, payload validation and isolation between owners.

mod support;

use axum::http::StatusCode;
use common::{
    revocation::{InMemoryRevocationList, RevocationList},
    token::TokenType,
};
use serde_json::json;
use support::{
    access_token, body_bytes, body_json, build_test_app, build_test_app_with_revocations,
    claims_for, delete_auth, get_auth, post_json_auth, put_json_auth, send, sign, sign_token,
};
use uuid::Uuid;

const ROOMS: &str = "/api/users/me/rooms";

async fn create_room(app: axum::Router, token: &str, name: &str) -> String {
    let response = post_json_auth(app, ROOMS, token, json!({ "name": name })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"]
        .as_str()
        .expect("created id")
        .to_string()
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let app = build_test_app();
    let response = send(app, "GET", "/health", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = build_test_app();
    let response = send(app, "GET", ROOMS, None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Unauthorized");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = build_test_app();
    let response = get_auth(app, ROOMS, "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let app = build_test_app();
    let token = sign_token(Uuid::new_v4(), TokenType::Refresh, 900);
    let response = get_auth(app, ROOMS, &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = build_test_app();
    let token = sign_token(Uuid::new_v4(), TokenType::Access, -600);
    let response = get_auth(app, ROOMS, &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_room_route_requires_a_token() {
    let app = build_test_app();
    let room = format!("{ROOMS}/{}", Uuid::new_v4());

    for (method, uri, body) in [
        ("POST", ROOMS, Some(json!({ "name": "foobar" }))),
        ("GET", room.as_str(), None),
        ("PUT", room.as_str(), Some(json!({ "name": "barfoo" }))),
        ("DELETE", room.as_str(), None),
    ] {
        let response = send(app.clone(), method, uri, None, body).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} must require a token"
        );
    }
}

#[tokio::test]
async fn revoked_access_token_is_unauthorized() {
    let revocations = InMemoryRevocationList::new();
    let app = build_test_app_with_revocations(revocations.clone());
    let claims = claims_for(Uuid::new_v4(), TokenType::Access, 900);
    let token = sign(&claims);

    let response = get_auth(app.clone(), ROOMS, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    revocations.revoke(&claims).await.unwrap();

    let response = get_auth(app.clone(), ROOMS, &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let other = access_token(claims.sub);
    let response = get_auth(app, ROOMS, &other).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// CRUD flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn room_lifecycle() {
    let app = build_test_app();
    let token = access_token(Uuid::new_v4());

    let id = create_room(app.clone(), &token, "foobar").await;
    assert!(!id.is_empty());
    let room = format!("{ROOMS}/{id}");

    let response = get_auth(app.clone(), &room, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["name"], "foobar");

    let response = put_json_auth(app.clone(), &room, &token, json!({ "name": "barfoo" })).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());

    let response = get_auth(app.clone(), &room, &token).await;
    assert_eq!(body_json(response).await["name"], "barfoo");

    let response = delete_auth(app.clone(), &room, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &room, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &room, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_room_appears_in_listing() {
    let app = build_test_app();
    let token = access_token(Uuid::new_v4());

    let first = create_room(app.clone(), &token, "general").await;
    let second = create_room(app.clone(), &token, "random").await;

    let response = get_auth(app, ROOMS, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([
            { "id": first, "name": "general" },
            { "id": second, "name": "random" },
        ])
    );
}

#[tokio::test]
async fn listing_is_empty_for_new_user() {
    let app = build_test_app();
    let response = get_auth(app, ROOMS, &access_token(Uuid::new_v4())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn update_keeps_fields_not_in_payload() {
    let app = build_test_app();
    let token = access_token(Uuid::new_v4());

    let response = post_json_auth(
        app.clone(),
        ROOMS,
        &token,
        json!({ "name": "general", "description": "daily chatter" }),
    )
    .await;
    let id = body_json(response).await["id"].as_str().unwrap().to_string();
    let room = format!("{ROOMS}/{id}");

    let response = put_json_auth(app.clone(), &room, &token, json!({ "name": "lobby" })).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app.clone(), &room, &token).await).await;
    assert_eq!(json["name"], "lobby");
    assert_eq!(json["description"], "daily chatter");

    let response = put_json_auth(
        app.clone(),
        &room,
        &token,
        json!({ "description": "announcements" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app, &room, &token).await).await;
    assert_eq!(json["name"], "lobby");
    assert_eq!(json["description"], "announcements");
}

// ---------------------------------------------------------------------------
// Not found and validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_room_is_not_found() {
    let app = build_test_app();
    let token = access_token(Uuid::new_v4());

    for id in [Uuid::new_v4().to_string(), "id123456".to_string()] {
        let uri = format!("{ROOMS}/{id}");
        let response = get_auth(app.clone(), &uri, &token).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"].is_string());

        let response = put_json_auth(app.clone(), &uri, &token, json!({ "name": "x" })).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = delete_auth(app.clone(), &uri, &token).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn create_without_name_is_bad_request() {
    let app = build_test_app();
    let token = access_token(Uuid::new_v4());

    for body in [json!({}), json!({ "name": "" }), json!({ "name": "   " })] {
        let response = post_json_auth(app.clone(), ROOMS, &token, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Room name is required");
    }

    let response = get_auth(app, ROOMS, &token).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = build_test_app();
    let token = access_token(Uuid::new_v4());

    let request = axum::http::Request::builder()
        .method("POST")
        .uri(ROOMS)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{\"name\":"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(app, ROOMS, &token, json!({ "name": 42 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_name_update_is_rejected() {
    let app = build_test_app();
    let token = access_token(Uuid::new_v4());
    let id = create_room(app.clone(), &token, "general").await;
    let room = format!("{ROOMS}/{id}");

    let response = put_json_auth(app.clone(), &room, &token, json!({ "name": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get_auth(app, &room, &token).await).await;
    assert_eq!(json["name"], "general");
}

#[tokio::test]
async fn length_limits_are_inclusive() {
    let app = build_test_app();
    let token = access_token(Uuid::new_v4());

    let longest = json!({ "name": "n".repeat(100), "description": "d".repeat(1000) });
    let response = post_json_auth(app.clone(), ROOMS, &token, longest).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    for body in [
        json!({ "name": "n".repeat(101) }),
        json!({ "name": "general", "description": "d".repeat(1001) }),
    ] {
        let response = post_json_auth(app.clone(), ROOMS, &token, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let id = create_room(app.clone(), &token, "general").await;
    let room = format!("{ROOMS}/{id}");

    let response =
        put_json_auth(app.clone(), &room, &token, json!({ "description": "d".repeat(1001) })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response =
        put_json_auth(app, &room, &token, json!({ "description": "d".repeat(1000) })).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Ownership isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rooms_are_isolated_between_users() {
    let app = build_test_app();
    let alice = access_token(Uuid::new_v4());
    let bob = access_token(Uuid::new_v4());

    let id = create_room(app.clone(), &alice, "alice-only").await;
    let room = format!("{ROOMS}/{id}");

    let response = get_auth(app.clone(), ROOMS, &bob).await;
    assert_eq!(body_json(response).await, json!([]));

    let response = get_auth(app.clone(), &room, &bob).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = put_json_auth(app.clone(), &room, &bob, json!({ "name": "bob" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app.clone(), &room, &bob).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get_auth(app, &room, &alice).await).await;
    assert_eq!(json["name"], "alice-only");
}
