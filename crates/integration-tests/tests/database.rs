//! End-to-end flows against a real `PostgreSQL`.
//!
//! Skipped unless `BAZAAR_TEST_DATABASE_URL` is set.

use axum::http::{Method, StatusCode};
use serde_json::json;

use bazaar_api::db::ProductRepository;
use bazaar_api::models::CurrentUser;
use bazaar_api::services::auth::AuthService;
use bazaar_core::{ProductId, RatingScore, UserRole};
use bazaar_integration_tests::{TestApp, TestResponse, unique_email};

/// Create a product through the API and return its ID.
async fn create_product(app: &TestApp, cookie: &str, body: serde_json::Value) -> i64 {
    let resp = app
        .post("/api/products")
        .cookie(cookie)
        .json(&body)
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.text());
    resp.json()["id"].as_i64().unwrap()
}

/// Product names of a listing, in order.
fn names(resp: &TestResponse) -> Vec<String> {
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.text());
    resp.json()["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let Some((app, _pool)) = TestApp::with_database().await else {
        return;
    };
    let email = unique_email("shopper");

    let resp = app
        .post("/api/auth/register")
        .json(&json!({
            "email": email.to_uppercase(),
            "password": "correct horse",
            "name": " Shopper "
        }))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let user = resp.json();
    assert_eq!(user["email"], email.as_str());
    assert_eq!(user["name"], "Shopper");
    assert_eq!(user["role"], "customer");
    assert!(user.get("password_hash").is_none());
    let cookie = resp.session_cookie().unwrap();

    let resp = app.get("/api/auth/me").cookie(&cookie).send().await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["email"], email.as_str());

    let resp = app
        .post("/api/auth/register")
        .json(&json!({"email": email, "password": "another pass", "name": "Dup"}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let resp = app
        .post("/api/auth/login")
        .json(&json!({"email": email, "password": "wrong password"}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), "Invalid credentials");

    let resp = app
        .post("/api/auth/login")
        .json(&json!({"email": format!("  {email} "), "password": "correct horse"}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let new_cookie = resp.session_cookie().unwrap();
    assert_ne!(new_cookie, cookie);
}

#[tokio::test]
async fn test_login_unknown_email_matches_wrong_password() {
    let Some((app, _pool)) = TestApp::with_database().await else {
        return;
    };

    let resp = app
        .post("/api/auth/login")
        .json(&json!({"email": unique_email("ghost"), "password": "whatever123"}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), "Invalid credentials");
}

#[tokio::test]
async fn test_product_lifecycle() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };

    let admin = AuthService::new(&pool)
        .create_admin(&unique_email("admin"), "admin password", "Admin")
        .await
        .unwrap();
    let admin_cookie = app.session_for(&CurrentUser::from(&admin)).await;
    let shopper = AuthService::new(&pool)
        .register(&unique_email("rater"), "rater password", "Rater")
        .await
        .unwrap();
    let shopper_cookie = app.session_for(&CurrentUser::from(&shopper)).await;

    let resp = app
        .post("/api/products")
        .cookie(&admin_cookie)
        .json(&json!({
            "name": "Lifecycle Lamp",
            "price": "120.00",
            "category": "lighting",
            "stock_quantity": 12,
            "customization_options": [{"name": "Finish", "values": ["brass", "black"]}]
        }))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let product = resp.json();
    assert_eq!(product["seller_id"], admin.id.as_i32());
    assert_eq!(product["price"], "120.00");
    let id = product["id"].as_i64().unwrap();
    let path = format!("/api/products/{id}");

    let resp = app.get(&path).send().await;
    assert_eq!(resp.status, StatusCode::OK);

    // Oversell is refused and leaves stock untouched
    let resp = app
        .request(Method::PATCH, &format!("{path}/stock"))
        .cookie(&admin_cookie)
        .json(&json!({"delta": -13}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let resp = app
        .request(Method::PATCH, &format!("{path}/stock"))
        .cookie(&admin_cookie)
        .json(&json!({"delta": -2}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["stock_quantity"], 10);

    for score in [4, 5] {
        let resp = app
            .post(&format!("{path}/rating"))
            .cookie(&shopper_cookie)
            .json(&json!({ "score": score }))
            .send()
            .await;
        assert_eq!(resp.status, StatusCode::OK);
    }
    let resp = app.get(&path).send().await;
    let rating = &resp.json()["rating"];
    assert_eq!(rating["average"], "4.50");
    assert_eq!(rating["count"], 2);

    // Deactivated products disappear for everyone but admins
    let resp = app
        .request(Method::PUT, &path)
        .cookie(&admin_cookie)
        .json(&json!({"is_active": false}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.get(&path).send().await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get(&path).cookie(&admin_cookie).send().await.status,
        StatusCode::OK
    );

    let resp = app
        .request(Method::DELETE, &path)
        .cookie(&admin_cookie)
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    let resp = app
        .request(Method::DELETE, &path)
        .cookie(&admin_cookie)
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_promotes_customer() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };

    let auth = AuthService::new(&pool);
    let admin = auth
        .create_admin(&unique_email("boss"), "admin password", "Boss")
        .await
        .unwrap();
    let customer = auth
        .register(&unique_email("clerk"), "clerk password", "Clerk")
        .await
        .unwrap();
    let cookie = app.session_for(&CurrentUser::from(&admin)).await;

    let resp = app
        .request(Method::PATCH, &format!("/api/users/{}/role", customer.id))
        .cookie(&cookie)
        .json(&json!({"role": "admin"}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["role"], "admin");

    let resp = app
        .request(Method::PATCH, "/api/users/2147483647/role")
        .cookie(&cookie)
        .json(&json!({"role": "admin"}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_demoted_admin_loses_access() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (_boss, boss_cookie) = app.account_session(&pool, UserRole::Admin).await;
    let (former, former_cookie) = app.account_session(&pool, UserRole::Admin).await;

    let resp = app.get("/api/users").cookie(&former_cookie).send().await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .request(Method::PATCH, &format!("/api/users/{}/role", former.id))
        .cookie(&boss_cookie)
        .json(&json!({"role": "customer"}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    // The session still claims admin; the database no longer agrees
    let resp = app
        .post("/api/products")
        .cookie(&former_cookie)
        .json(&json!({"name": "Should Not Exist", "price": "1.00", "category": "misc"}))
        .send()
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    let resp = app.get("/api/users").cookie(&former_cookie).send().await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_demoted_outside_the_api_loses_access() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (admin, cookie) = app.account_session(&pool, UserRole::Admin).await;

    AuthService::new(&pool)
        .set_role(None, admin.id, UserRole::Customer)
        .await
        .unwrap();

    let resp = app.get("/api/users").cookie(&cookie).send().await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleted_admin_session_is_rejected() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (admin, cookie) = app.account_session(&pool, UserRole::Admin).await;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(admin.id)
        .execute(&pool)
        .await
        .unwrap();

    let resp = app.get("/api/users").cookie(&cookie).send().await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_filters_and_sorts() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (_admin, admin_cookie) = app.account_session(&pool, UserRole::Admin).await;
    let (_shopper, shopper_cookie) = app.account_session(&pool, UserRole::Customer).await;
    let category = format!("filters-{}", uuid::Uuid::new_v4().simple());

    let mut ids = Vec::new();
    for (name, price, stock, active) in [
        ("Brass 100% Lamp", "30.00", 5, true),
        ("Brass 1000 Lamp", "10.00", 0, true),
        ("Oak_Shelf", "50.00", 2, true),
        ("OakXShelf", "20.00", 1, true),
        ("Hidden Stool", "40.00", 3, false),
    ] {
        let body = json!({
            "name": name,
            "price": price,
            "category": category,
            "stock_quantity": stock,
            "is_active": active
        });
        ids.push(create_product(&app, &admin_cookie, body).await);
    }
    let list = |params: &str| format!("/api/products?category={category}&{params}");

    let resp = app.get(&list("")).send().await;
    assert_eq!(
        names(&resp),
        ["OakXShelf", "Oak_Shelf", "Brass 1000 Lamp", "Brass 100% Lamp"]
    );
    let resp = app.get(&list("sort=price_asc")).send().await;
    assert_eq!(
        names(&resp),
        ["Brass 1000 Lamp", "OakXShelf", "Brass 100% Lamp", "Oak_Shelf"]
    );
    let resp = app.get(&list("sort=price_desc")).send().await;
    assert_eq!(
        names(&resp),
        ["Oak_Shelf", "Brass 100% Lamp", "OakXShelf", "Brass 1000 Lamp"]
    );

    // Wildcards in the search term match literally
    let resp = app.get(&list("search=100%25")).send().await;
    assert_eq!(names(&resp), ["Brass 100% Lamp"]);
    let resp = app.get(&list("search=oak_")).send().await;
    assert_eq!(names(&resp), ["Oak_Shelf"]);

    let resp = app
        .get(&list("min_price=15&max_price=35&sort=price_asc"))
        .send()
        .await;
    assert_eq!(names(&resp), ["OakXShelf", "Brass 100% Lamp"]);
    let resp = app.get(&list("in_stock=true&sort=price_asc")).send().await;
    assert_eq!(names(&resp), ["OakXShelf", "Brass 100% Lamp", "Oak_Shelf"]);
    let resp = app.get(&list("in_stock=false")).send().await;
    assert_eq!(names(&resp), ["Brass 1000 Lamp"]);

    let resp = app.get(&list("limit=2&offset=1&sort=price_asc")).send().await;
    assert_eq!(names(&resp), ["OakXShelf", "Brass 100% Lamp"]);
    assert_eq!(resp.json()["limit"], 2);
    assert_eq!(resp.json()["offset"], 1);

    let resp = app.get(&list("include_inactive=true")).send().await;
    assert_eq!(names(&resp).len(), 4);
    let resp = app
        .get(&list("include_inactive=true"))
        .cookie(&shopper_cookie)
        .send()
        .await;
    assert_eq!(names(&resp).len(), 4);
    let resp = app
        .get(&list("include_inactive=true"))
        .cookie(&admin_cookie)
        .send()
        .await;
    assert!(names(&resp).contains(&"Hidden Stool".to_string()));
    assert_eq!(names(&resp).len(), 5);

    // Rated products first, best average first; unrated ones keep newest order
    for (index, scores) in [(0, [5, 5].as_slice()), (2, [4].as_slice())] {
        for score in scores {
            let resp = app
                .post(&format!("/api/products/{}/rating", ids[index]))
                .cookie(&shopper_cookie)
                .json(&json!({ "score": score }))
                .send()
                .await;
            assert_eq!(resp.status, StatusCode::OK);
        }
    }
    let resp = app.get(&list("sort=rating")).send().await;
    assert_eq!(
        names(&resp),
        ["Brass 100% Lamp", "Oak_Shelf", "OakXShelf", "Brass 1000 Lamp"]
    );
}

#[tokio::test]
async fn test_many_ratings_keep_an_exact_average() {
    let Some((app, pool)) = TestApp::with_database().await else {
        return;
    };
    let (_admin, cookie) = app.account_session(&pool, UserRole::Admin).await;
    let id = create_product(
        &app,
        &cookie,
        json!({"name": "Much Rated Kettle", "price": "35.00", "category": "kitchen"}),
    )
    .await;

    let repo = ProductRepository::new(&pool);
    let product_id = ProductId::new(i32::try_from(id).unwrap());
    repo.add_rating(product_id, RatingScore::new(2).unwrap())
        .await
        .unwrap();
    for _ in 0..40 {
        repo.add_rating(product_id, RatingScore::new(1).unwrap())
            .await
            .unwrap();
    }

    let resp = app.get(&format!("/api/products/{id}")).send().await;
    let rating = &resp.json()["rating"];
    assert_eq!(rating["count"], 41);
    assert_eq!(rating["average"], "1.02");
}
