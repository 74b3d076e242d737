//! Integration tests for login, logout, OTP flows and session persistence.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use pantry_client::session::{TOKEN_KEY, USER_KEY};
use pantry_client::{ApiClient, ClientConfig, FileStore, SessionStore};
use pantry_core::UserRole;
use pantry_integration_tests::{Harness, MockResponse};
use reqwest::Method;
use secrecy::SecretString;
use serde_json::{Value, json};

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_persists_token_and_user() {
    let h = Harness::start().await.unwrap();
    let user = json!({"id": 1, "email": "a@b.com", "role": "admin", "name": "Ada"});
    h.respond(
        Method::POST,
        "/auth/login",
        MockResponse::envelope(json!({"token": "t1", "user": user})),
    );
    h.respond(Method::GET, "/users", MockResponse::envelope(json!([])));

    let envelope = h.client.login("a@b.com", &password("x")).await.unwrap();

    assert!(envelope.is_success());
    let login = h.last_request().unwrap();
    assert_eq!(login.json(), json!({"identifier": "a@b.com", "password": "x"}));

    assert_eq!(h.store.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
    let stored: Value = serde_json::from_str(&h.store.get(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored, user);

    assert!(h.client.is_authenticated());
    let profile = h.client.user_data();
    assert_eq!(profile.email.as_deref(), Some("a@b.com"));
    assert_eq!(profile.role(), Some(UserRole::Admin));

    h.client.list_users().await.unwrap();
    assert_eq!(
        h.last_request().unwrap().header("authorization"),
        Some("Bearer t1")
    );
}

#[tokio::test]
async fn test_login_with_error_code_persists_nothing() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::POST,
        "/auth/login",
        MockResponse::json(
            200,
            &json!({"errorCode": 1, "errorMessage": "Invalid credentials", "data": null}),
        ),
    );

    let envelope = h.client.login("a@b.com", &password("wrong")).await.unwrap();

    assert!(!envelope.is_success());
    assert_eq!(envelope.message(), Some("Invalid credentials"));
    assert!(h.store.is_empty());
    assert!(!h.client.is_authenticated());
}

#[tokio::test]
async fn test_login_http_error_persists_nothing() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::POST,
        "/auth/login",
        MockResponse::json(400, &json!({"errorCode": 2, "errorMessage": "Account locked"})),
    );

    let err = h.client.login("a@b.com", &password("x")).await.unwrap_err();

    assert_eq!(err.to_string(), "Account locked");
    assert_eq!(err.code(), Some(2));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_login_success_without_token_persists_nothing() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::POST,
        "/auth/login",
        MockResponse::envelope(json!({"user": {"id": 1}})),
    );

    let envelope = h.client.login("a@b.com", &password("x")).await.unwrap();

    assert!(envelope.is_success());
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_login_replaces_previous_session() {
    let h = Harness::start().await.unwrap();
    h.seed_session("old").unwrap();
    h.respond(
        Method::POST,
        "/auth/login",
        MockResponse::envelope(json!({"token": "new", "user": {"id": 2, "role": "vendor"}})),
    );

    h.client.login("v@b.com", &password("x")).await.unwrap();

    assert_eq!(h.store.get(TOKEN_KEY).unwrap().as_deref(), Some("new"));
    assert_eq!(h.client.user_data().role(), Some(UserRole::Vendor));
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_clears_both_keys() {
    let h = Harness::start().await.unwrap();
    h.seed_session("t1").unwrap();

    h.client.logout().unwrap();

    assert_eq!(h.store.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(h.store.get(USER_KEY).unwrap(), None);
    assert!(h.backend.requests().is_empty());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let h = Harness::start().await.unwrap();

    h.client.logout().unwrap();
    h.client.logout().unwrap();

    assert!(h.store.is_empty());
    assert!(!h.client.is_authenticated());
}

// =============================================================================
// OTP and Password Reset
// =============================================================================

#[tokio::test]
async fn test_otp_and_reset_payloads() {
    let h = Harness::start().await.unwrap();
    h.respond(Method::POST, "/auth/send-otp", MockResponse::envelope(Value::Null));
    h.respond(Method::POST, "/auth/verify-otp", MockResponse::envelope(Value::Null));
    h.respond(
        Method::POST,
        "/auth/reset-password",
        MockResponse::envelope(Value::Null),
    );

    h.client.request_otp("a@b.com").await.unwrap();
    h.client.verify_otp("a@b.com", "123456").await.unwrap();
    h.client
        .reset_password("a@b.com", "123456", &password("n3w"))
        .await
        .unwrap();

    let bodies: Vec<Value> = h.backend.requests().iter().map(|r| r.json()).collect();
    assert_eq!(
        bodies,
        vec![
            json!({"identifier": "a@b.com"}),
            json!({"identifier": "a@b.com", "otp": "123456"}),
            json!({"identifier": "a@b.com", "otp": "123456", "newPassword": "n3w"}),
        ]
    );
    assert!(h.store.is_empty());
}

// =============================================================================
// Durable Store
// =============================================================================

#[tokio::test]
async fn test_file_store_survives_client_restart_and_401() {
    let h = Harness::start().await.unwrap();
    h.respond(
        Method::POST,
        "/auth/login",
        MockResponse::envelope(json!({"token": "disk", "user": {"id": 9}})),
    );
    h.respond(Method::GET, "/orders/1", MockResponse::text(401, "expired"));

    let path = std::env::temp_dir()
        .join(format!("pantry-it-{}", uuid::Uuid::new_v4()))
        .join("session.json");
    let build = || {
        let config = ClientConfig::new(&h.backend.url("/api")).unwrap();
        ApiClient::builder(config)
            .session_store(Arc::new(FileStore::new(&path)))
            .build()
            .unwrap()
    };

    build().login("a@b.com", &password("x")).await.unwrap();

    let restarted = build();
    assert!(restarted.is_authenticated());
    assert_eq!(restarted.user_data().id, Some(pantry_core::UserId::new(9)));

    restarted
        .get_order(pantry_core::OrderId::new(1))
        .await
        .unwrap_err();
    assert!(!build().is_authenticated());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
