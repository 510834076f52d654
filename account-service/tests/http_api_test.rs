//! HTTP surface tests: routing, status codes and response shapes,
//! driven through the full router with `oneshot`.

mod common;

use account_service::build_router;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::test_env;
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn app() -> Router {
    let env = test_env();
    build_router(env.state).expect("Failed to build router")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> Value {
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({ "email": email, "name": "Test User", "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn register_returns_created_with_token_pair() {
    let app = app();

    let body = register(&app, "ivy@example.com", "password123").await;

    assert!(body["accessToken"].as_str().is_some());
    assert!(body["refreshToken"].as_str().is_some());
    assert!(body["expiresAt"].as_str().is_some());
    assert_eq!(body["user"]["email"], "ivy@example.com");
    assert_eq!(body["user"]["role"], "user");
    // Nothing secret leaks through the user echo
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_validates_payload() {
    let app = app();

    // Bad email
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({ "email": "not-an-email", "name": "X", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Password too short
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({ "email": "ok@example.com", "name": "X", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Malformed JSON
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    register(&app, "judy@example.com", "password123").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({ "email": "Judy@Example.com", "name": "Judy", "password": "password456" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_succeeds_and_rejects_bad_credentials() {
    let app = app();
    register(&app, "kim@example.com", "password123").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": "kim@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["accessToken"].as_str().is_some());

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": "kim@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_reuse() {
    let app = app();
    let body = register(&app, "leo@example.com", "password123").await;
    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    let refresh_token = body["refreshToken"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/refresh",
            json!({ "userId": user_id, "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refreshToken"], refresh_token.as_str());

    // The consumed secret no longer refreshes
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/refresh",
            json!({ "userId": user_id, "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_requires_and_honors_bearer_token() {
    let app = app();
    let body = register(&app, "mia@example.com", "password123").await;
    let access_token = body["accessToken"].as_str().unwrap().to_string();

    // No token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users/me")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users/me")
                .header("Authorization", format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "mia@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn logout_revokes_refresh_tokens() {
    let app = app();
    let body = register(&app, "nina@example.com", "password123").await;
    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    let access_token = body["accessToken"].as_str().unwrap().to_string();
    let refresh_token = body["refreshToken"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header("Authorization", format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Every stored refresh credential is gone
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/refresh",
            json!({ "userId": user_id, "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_me_removes_account_and_sessions() {
    let app = app();
    let body = register(&app, "olive@example.com", "password123").await;
    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    let access_token = body["accessToken"].as_str().unwrap().to_string();
    let refresh_token = body["refreshToken"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/users/me")
                .header("Authorization", format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The access token still verifies, but its subject no longer exists
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/users/me")
                .header("Authorization", format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Refresh tokens were revoked alongside the account
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/refresh",
            json!({ "userId": user_id, "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = app();

    // Without a caller-supplied id, one is minted
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let minted = response
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .unwrap()
        .to_string();
    assert!(!minted.is_empty());

    // A sane caller-supplied id is echoed back
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .header("x-request-id", "client-id-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "client-id-42"
    );

    // An id with unprintable content is replaced, not echoed
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .header("x-request-id", "bad id with spaces")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let replaced = response
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert_ne!(replaced, "bad id with spaces");
    assert!(!replaced.is_empty());
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}
