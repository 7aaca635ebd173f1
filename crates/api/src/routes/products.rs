//! Product catalog route handlers.
//!
//! Browsing is public; inactive products are visible to admins only.
//! Writes require an admin session, ratings any logged-in user.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use bazaar_core::{ProductId, RatingScore};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth};
use crate::models::{CurrentUser, NewProduct, Product, ProductQuery, ProductUpdate};
use crate::state::AppState;

/// One page of products.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub limit: i64,
    pub offset: i64,
}

/// Body of `PATCH /api/products/{id}/stock`.
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i32,
}

/// Body of `POST /api/products/{id}/rating`.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub score: RatingScore,
}

fn is_admin(user: Option<&CurrentUser>) -> bool {
    user.is_some_and(CurrentUser::is_admin)
}

fn not_found(id: ProductId) -> AppError {
    AppError::NotFound(format!("product {id}"))
}

/// List products with filters, sorting and paging.
///
/// # Errors
///
/// 400 for out-of-range paging or an inverted price range.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    AppQuery(query): AppQuery<ProductQuery>,
) -> Result<AppJson<ProductPage>> {
    let query = query.validate()?;
    let include_inactive = query.include_inactive && is_admin(user.as_ref());

    let products = state.products().list(&query, include_inactive).await?;

    Ok(AppJson(ProductPage {
        products,
        limit: query.limit.unwrap_or_default(),
        offset: query.offset.unwrap_or_default(),
    }))
}

/// Show one product.
///
/// # Errors
///
/// 404 if the product doesn't exist, or is inactive and the caller isn't an admin.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    AppPath(id): AppPath<ProductId>,
) -> Result<AppJson<Product>> {
    let product = state
        .products()
        .get_by_id(id)
        .await?
        .filter(|p| p.is_active || is_admin(user.as_ref()))
        .ok_or_else(|| not_found(id))?;

    Ok(AppJson(product))
}

/// Create a product listed by the calling admin.
///
/// # Errors
///
/// 400 if the body fails validation.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(body): AppJson<NewProduct>,
) -> Result<(StatusCode, AppJson<Product>)> {
    let product = body.validate()?;

    let product = state.products().create(&product, Some(admin.id)).await?;

    tracing::info!(product_id = %product.id, admin_id = %admin.id, "Product created");
    Ok((StatusCode::CREATED, AppJson(product)))
}

/// Partially update a product.
///
/// # Errors
///
/// 400 if the body is empty or invalid; 404 if the product doesn't exist.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<ProductId>,
    AppJson(body): AppJson<ProductUpdate>,
) -> Result<AppJson<Product>> {
    let update = body.validate()?;

    let product = state
        .products()
        .update(id, update)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(id),
            other => other.into(),
        })?;

    tracing::info!(product_id = %id, admin_id = %admin.id, "Product updated");
    Ok(AppJson(product))
}

/// Delete a product.
///
/// # Errors
///
/// 404 if the product doesn't exist.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<ProductId>,
) -> Result<StatusCode> {
    if !state.products().delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(product_id = %id, admin_id = %admin.id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Change stock by a signed delta.
///
/// # Errors
///
/// 404 if the product doesn't exist; 409 if stock would drop below zero.
pub async fn adjust_stock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<ProductId>,
    AppJson(body): AppJson<StockAdjustment>,
) -> Result<AppJson<Product>> {
    let product = state
        .products()
        .adjust_stock(id, body.delta)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(id),
            other => other.into(),
        })?;

    tracing::info!(
        product_id = %id,
        admin_id = %admin.id,
        delta = body.delta,
        stock = product.stock_quantity,
        "Stock adjusted"
    );
    Ok(AppJson(product))
}

/// Rate a product from 1 to 5.
///
/// # Errors
///
/// 400 for a score outside 1..=5; 404 if no active product has this ID.
pub async fn rate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<ProductId>,
    AppJson(body): AppJson<RatingRequest>,
) -> Result<AppJson<Product>> {
    let product = state
        .products()
        .add_rating(id, body.score)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(id),
            other => other.into(),
        })?;

    tracing::debug!(
        product_id = %id,
        user_id = %user.id,
        score = body.score.value(),
        "Product rated"
    );
    Ok(AppJson(product))
}
