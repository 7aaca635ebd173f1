//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (database ping)
//!
//! # Auth (strict rate limit)
//! POST   /api/auth/register         - Create customer account + session
//! POST   /api/auth/login            - Start session
//! POST   /api/auth/logout           - End session
//! GET    /api/auth/me               - Current user
//!
//! # Products
//! GET    /api/products              - List (filters, sort, paging)
//! POST   /api/products              - Create (admin)
//! GET    /api/products/{id}         - Detail
//! PUT    /api/products/{id}         - Partial update (admin)
//! DELETE /api/products/{id}         - Delete (admin)
//! PATCH  /api/products/{id}/stock   - Adjust stock by delta (admin)
//! POST   /api/products/{id}/rating  - Rate 1..=5 (user)
//!
//! # Users (admin)
//! GET    /api/users                 - List accounts
//! PATCH  /api/users/{id}/role       - Change role
//! ```

pub mod auth;
pub mod health;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/{id}/stock", patch(products::adjust_stock))
        .route("/{id}/rating", post(products::rate))
}

/// Create the user management routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}/role", patch(users::set_role))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/products", product_routes())
        .nest("/users", user_routes())
        .layer(api_rate_limiter())
        .nest("/auth", auth_routes().layer(auth_rate_limiter()));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
}
