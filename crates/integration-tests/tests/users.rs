//! Admin user management: authorization and validation paths.

use axum::http::{Method, StatusCode};
use serde_json::json;

use bazaar_core::UserRole;
use bazaar_integration_tests::TestApp;

#[tokio::test]
async fn test_list_requires_session() {
    let app = TestApp::new();
    let resp = app.get("/api/users").send().await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_forbidden_for_customer() {
    let app = TestApp::new();
    let cookie = app.customer_session(5).await;
    let resp = app.get("/api/users").cookie(&cookie).send().await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_rejects_bad_paging() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (_admin, cookie) = app.account_session(&pool, UserRole::Admin).await;
    let resp = app
        .get("/api/users?offset=-1")
        .cookie(&cookie)
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_cannot_demote_self() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (admin, cookie) = app.account_session(&pool, UserRole::Admin).await;
    let resp = app
        .request(Method::PATCH, &format!("/api/users/{}/role", admin.id))
        .cookie(&cookie)
        .json(&json!({"role": "customer"}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "You cannot remove your own admin role");
}

#[tokio::test]
async fn test_role_change_rejects_unknown_role() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (_admin, cookie) = app.account_session(&pool, UserRole::Admin).await;
    let (customer, _) = app.account_session(&pool, UserRole::Customer).await;
    let resp = app
        .request(Method::PATCH, &format!("/api/users/{}/role", customer.id))
        .cookie(&cookie)
        .json(&json!({"role": "superuser"}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_change_forbidden_for_customer() {
    let app = TestApp::new();
    let cookie = app.customer_session(5).await;
    let resp = app
        .request(Method::PATCH, "/api/users/5/role")
        .cookie(&cookie)
        .json(&json!({"role": "admin"}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}
