//! Authentication endpoints that are decided before any database access.

use axum::http::StatusCode;
use serde_json::json;

use bazaar_integration_tests::TestApp;

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let app = TestApp::new();
    let resp = app
        .post("/api/auth/register")
        .json(&json!({"email": "not-an-email", "password": "long enough pw", "name": "Ada"}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid email address");
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::new();
    let resp = app
        .post("/api/auth/register")
        .json(&json!({"email": "ada@example.com", "password": "short", "name": "Ada"}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().contains("at least 8"));
}

#[tokio::test]
async fn test_register_rejects_blank_name() {
    let app = TestApp::new();
    let resp = app
        .post("/api/auth/register")
        .json(&json!({"email": "ada@example.com", "password": "long enough pw", "name": "   "}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_ignores_role_field() {
    // Unknown fields are ignored, so a smuggled role still fails on the
    // real validation error rather than being honored.
    let app = TestApp::new();
    let resp = app
        .post("/api/auth/register")
        .json(&json!({
            "email": "bad",
            "password": "long enough pw",
            "name": "Mallory",
            "role": "admin"
        }))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_json_error() {
    let app = TestApp::new();
    let resp = app
        .post("/api/auth/login")
        .raw_json("{\"email\": ")
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.error().is_empty());
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new();
    let resp = app.get("/api/auth/me").send().await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), "Authentication required");
}

#[tokio::test]
async fn test_me_with_unknown_cookie() {
    let app = TestApp::new();
    let resp = app
        .get("/api/auth/me")
        .cookie("bazaar_session=AAAAAAAAAAAAAAAAAAAAAA")
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = TestApp::new();
    let resp = app.post("/api/auth/logout").send().await;

    assert_eq!(resp.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    let cookie = app.customer_session(1).await;

    let resp = app.post("/api/auth/logout").cookie(&cookie).send().await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    // The old cookie no longer authenticates
    let resp = app
        .post("/api/products/1/rating")
        .cookie(&cookie)
        .json(&json!({"score": 9}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_endpoints_rate_limited() {
    let app = TestApp::new();

    for _ in 0..5 {
        let resp = app.post("/api/auth/login").raw_json("{}").send().await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    }

    let resp = app.post("/api/auth/login").raw_json("{}").send().await;
    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.header("content-type"), Some("application/json"));
    assert!(resp.header("retry-after").is_some());
    assert_eq!(resp.error(), "Too many requests");
}
