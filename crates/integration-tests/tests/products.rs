//! Product endpoints: authorization and validation paths.

use axum::http::{Method, StatusCode};
use serde_json::json;

use bazaar_core::UserRole;
use bazaar_integration_tests::TestApp;

fn valid_product() -> serde_json::Value {
    json!({
        "name": "Walnut Desk Organizer",
        "description": "Three compartments.",
        "price": "49.00",
        "category": "home",
        "stock_quantity": 12
    })
}

#[tokio::test]
async fn test_list_rejects_zero_limit() {
    let app = TestApp::new();
    let resp = app.get("/api/products?limit=0").send().await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().starts_with("limit"));
}

#[tokio::test]
async fn test_list_rejects_oversized_limit() {
    let app = TestApp::new();
    let resp = app.get("/api/products?limit=101").send().await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_rejects_inverted_price_range() {
    let app = TestApp::new();
    let resp = app
        .get("/api/products?min_price=50&max_price=10")
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().contains("min_price"));
}

#[tokio::test]
async fn test_list_rejects_unknown_sort() {
    let app = TestApp::new();
    let resp = app.get("/api/products?sort=cheapest").send().await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_show_rejects_non_numeric_id() {
    let app = TestApp::new();
    let resp = app.get("/api/products/abc").send().await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_requires_session() {
    let app = TestApp::new();
    let resp = app
        .post("/api/products")
        .json(&valid_product())
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_forbidden_for_customer() {
    let app = TestApp::new();
    let cookie = app.customer_session(2).await;
    let resp = app
        .post("/api/products")
        .cookie(&cookie)
        .json(&valid_product())
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.error(), "Admin access required");
}

#[tokio::test]
async fn test_admin_route_fails_closed_without_database() {
    // The admin claim in the session is not trusted on its own
    let app = TestApp::new();
    let cookie = app.admin_session(1).await;

    let resp = app
        .post("/api/products")
        .cookie(&cookie)
        .json(&valid_product())
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.error(), "Internal server error");
}

#[tokio::test]
async fn test_create_rejects_invalid_body() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (_admin, cookie) = app.account_session(&pool, UserRole::Admin).await;

    let cases = [
        ("price", json!("-5.00"), "price"),
        ("price", json!("9.999"), "price"),
        ("stock_quantity", json!(-1), "stock_quantity"),
        ("name", json!("  "), "name"),
    ];
    for (field, value, mentioned) in cases {
        let mut body = valid_product();
        body[field] = value.clone();

        let resp = app
            .post("/api/products")
            .cookie(&cookie)
            .json(&body)
            .send()
            .await;

        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{field} = {value}");
        assert!(resp.error().contains(mentioned), "{}", resp.error());
    }
}

#[tokio::test]
async fn test_update_rejects_empty_body() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (_admin, cookie) = app.account_session(&pool, UserRole::Admin).await;

    let resp = app
        .request(Method::PUT, "/api/products/1")
        .cookie(&cookie)
        .json(&json!({}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.error().contains("no fields to update"));
}

#[tokio::test]
async fn test_update_forbidden_for_customer() {
    let app = TestApp::new();
    let cookie = app.customer_session(2).await;
    let resp = app
        .request(Method::PUT, "/api/products/1")
        .cookie(&cookie)
        .json(&json!({"is_active": false}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_requires_session() {
    let app = TestApp::new();
    let resp = app.request(Method::DELETE, "/api/products/1").send().await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stock_adjust_forbidden_for_customer() {
    let app = TestApp::new();
    let cookie = app.customer_session(2).await;
    let resp = app
        .request(Method::PATCH, "/api/products/1/stock")
        .cookie(&cookie)
        .json(&json!({"delta": -1}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rating_requires_session() {
    let app = TestApp::new();
    let resp = app
        .post("/api/products/1/rating")
        .json(&json!({"score": 4}))
        .send()
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rating_rejects_out_of_range_score() {
    let app = TestApp::new();
    let cookie = app.customer_session(2).await;

    for score in [0, 6] {
        let resp = app
            .post("/api/products/1/rating")
            .cookie(&cookie)
            .json(&json!({ "score": score }))
            .send()
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "score {score}");
    }
}
