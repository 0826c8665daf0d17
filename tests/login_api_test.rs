mod common;

use axum::http::StatusCode;
use common::*;
use tagwizard::login_api;
use tagwizard::store::{MemoryUserStore, UserStore};

#[tokio::test]
async fn test_unknown_email_creates_account() {
    let store = MemoryUserStore::new();
    let app = login_api::router(store.clone());

    let response = send(
        &app,
        post_json("/api/login", r#"{"email":"new@example.com","password":"pw"}"#, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Account created");

    let user = store.find_by_email("new@example.com").await.unwrap().unwrap();
    assert_ne!(user.password_hash, "pw");
}

#[tokio::test]
async fn test_existing_user_login() {
    let app = login_api::router(MemoryUserStore::new());
    let credentials = r#"{"email":"ada@example.com","password":"s3cret"}"#;
    send(&app, post_json("/api/login", credentials, None)).await;

    let response = send(&app, post_json("/api/login", credentials, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");

    let response = send(
        &app,
        post_json("/api/login", r#"{"email":"ada@example.com","password":"wrong"}"#, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid password");
}

#[tokio::test]
async fn test_missing_fields() {
    let store = MemoryUserStore::new();
    let app = login_api::router(store.clone());

    for payload in [
        r#"{"email":"ada@example.com"}"#,
        r#"{"password":"pw"}"#,
        r#"{"email":"","password":"pw"}"#,
        r#"{"email":"ada@example.com","password":""}"#,
    ] {
        let response = send(&app, post_json("/api/login", payload, None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", payload);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email and password are required");
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let app = login_api::router(MemoryUserStore::new());
    let request = axum::http::Request::options("/api/login")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_unparseable_bodies_get_json_reply() {
    let store = MemoryUserStore::new();
    let app = login_api::router(store.clone());

    for payload in ["{not json", r#"{"email":42,"password":"pw"}"#, "null"] {
        let response = send(&app, post_json("/api/login", payload, None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", payload);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid JSON body");
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_missing_content_type_still_parsed() {
    let app = login_api::router(MemoryUserStore::new());
    let request = axum::http::Request::post("/api/login")
        .body(axum::body::Body::from(
            r#"{"email":"ada@example.com","password":"s3cret"}"#,
        ))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["message"], "Account created");
}
