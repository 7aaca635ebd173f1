//! Product repository for database operations.
//!
//! Stock changes and rating folds are single `UPDATE ... RETURNING`
//! statements, so concurrent requests never lose an update.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use bazaar_core::{Price, ProductId, RatingScore, UserId};

use super::RepositoryError;
use crate::models::product::{
    CustomizationOption, NewProduct, Product, ProductQuery, ProductUpdate, RatingSummary,
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, images, stock_quantity, \
     seller_id, customization_options, rating_sum, rating_count, is_active, \
     created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    category: String,
    images: Vec<String>,
    stock_quantity: i32,
    seller_id: Option<i32>,
    customization_options: Json<Vec<CustomizationOption>>,
    rating_sum: i64,
    rating_count: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price,
            category: row.category,
            images: row.images,
            stock_quantity: row.stock_quantity,
            seller_id: row.seller_id.map(UserId::new),
            customization_options: row.customization_options.0,
            rating: RatingSummary::from_totals(row.rating_sum, row.rating_count),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Catalog-wide totals used by `bazaar-cli inspect summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct CatalogStats {
    pub total: i64,
    pub active: i64,
    pub units_in_stock: i64,
    pub out_of_stock: i64,
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    /// List products matching a validated query.
    ///
    /// Inactive products are included only when `include_inactive` is true.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        query: &ProductQuery,
        include_inactive: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

        if !include_inactive {
            qb.push(" AND is_active");
        }
        if let Some(category) = &query.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(min) = query.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = query.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }
        match query.in_stock {
            Some(true) => {
                qb.push(" AND stock_quantity > 0");
            }
            Some(false) => {
                qb.push(" AND stock_quantity = 0");
            }
            None => {}
        }

        qb.push(" ORDER BY ").push(query.sort.order_by());
        qb.push(" LIMIT ")
            .push_bind(query.limit.unwrap_or(crate::models::product::DEFAULT_PAGE_SIZE))
            .push(" OFFSET ")
            .push_bind(query.offset.unwrap_or(0));

        let rows = qb.build_query_as::<ProductRow>().fetch_all(self.pool).await?;
        into_products(rows)
    }

    /// Insert a validated product listed by `seller_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a constraint rejects the row.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        product: &NewProduct,
        seller_id: Option<UserId>,
    ) -> Result<Product, RepositoryError> {
        Self::create_in(self.pool, product, seller_id).await
    }

    /// Like [`create`](Self::create), but on `executor`, e.g. an open
    /// transaction.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    pub async fn create_in<'e, E>(
        executor: E,
        product: &NewProduct,
        seller_id: Option<UserId>,
    ) -> Result<Product, RepositoryError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO products \
             (name, description, price, category, images, stock_quantity, seller_id, \
              customization_options, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.category)
            .bind(&product.images)
            .bind(product.stock_quantity)
            .bind(seller_id)
            .bind(Json(&product.customization_options))
            .bind(product.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| RepositoryError::from_write(e, "product violates a constraint"))?;

        Product::try_from(row)
    }

    /// Apply a validated partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if a constraint rejects the change.
    pub async fn update(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE products SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = update.name {
                set.push("name = ").push_bind_unseparated(name);
            }
            if let Some(description) = update.description {
                set.push("description = ").push_bind_unseparated(description);
            }
            if let Some(price) = update.price {
                set.push("price = ").push_bind_unseparated(price);
            }
            if let Some(category) = update.category {
                set.push("category = ").push_bind_unseparated(category);
            }
            if let Some(images) = update.images {
                set.push("images = ").push_bind_unseparated(images);
            }
            if let Some(stock_quantity) = update.stock_quantity {
                set.push("stock_quantity = ")
                    .push_bind_unseparated(stock_quantity);
            }
            if let Some(options) = update.customization_options {
                set.push("customization_options = ")
                    .push_bind_unseparated(Json(options));
            }
            if let Some(is_active) = update.is_active {
                set.push("is_active = ").push_bind_unseparated(is_active);
            }
            set.push("updated_at = NOW()");
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {PRODUCT_COLUMNS}"));

        qb.build_query_as::<ProductRow>()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "product violates a constraint"))?
            .ok_or(RepositoryError::NotFound)
            .and_then(Product::try_from)
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the absolute stock level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if `quantity` is negative.
    pub async fn set_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products SET stock_quantity = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(quantity)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "stock cannot be negative"))?
            .ok_or(RepositoryError::NotFound)
            .and_then(Product::try_from)
    }

    /// Change the stock level by `delta` units.
    ///
    /// The guard and the write happen in one statement, so two concurrent
    /// sales cannot both take the last unit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the result would be negative or overflow.
    pub async fn adjust_stock(
        &self,
        id: ProductId,
        delta: i32,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products \
             SET stock_quantity = (stock_quantity::BIGINT + $2)::INTEGER, updated_at = NOW() \
             WHERE id = $1 AND stock_quantity::BIGINT + $2 BETWEEN 0 AND 2147483647 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(i64::from(delta))
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => Product::try_from(row),
            None if self.exists(id).await? => Err(RepositoryError::Conflict(format!(
                "insufficient stock for a change of {delta}"
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Give every product with zero stock `quantity` units.
    ///
    /// # Returns
    ///
    /// Number of products restocked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `quantity` is negative.
    pub async fn restock_empty(
        &self,
        quantity: i32,
        include_inactive: bool,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET stock_quantity = $1, updated_at = NOW() \
             WHERE stock_quantity = 0 AND (is_active OR $2)",
        )
        .bind(quantity)
        .bind(include_inactive)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "stock cannot be negative"))?;

        Ok(result.rows_affected())
    }

    /// Products with at most `threshold` units, emptiest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self, threshold: i32) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE stock_quantity <= $1 ORDER BY stock_quantity ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(threshold)
            .fetch_all(self.pool)
            .await?;
        into_products(rows)
    }

    /// Add one score to the product's rating totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no active product has this ID.
    pub async fn add_rating(
        &self,
        id: ProductId,
        score: RatingScore,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products SET \
               rating_sum = rating_sum + $2, \
               rating_count = rating_count + 1, \
               updated_at = NOW() \
             WHERE id = $1 AND is_active \
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(i64::from(score.value()))
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
            .and_then(Product::try_from)
    }

    /// Catalog-wide totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<CatalogStats, RepositoryError> {
        let stats = sqlx::query_as::<_, CatalogStats>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE is_active) AS active, \
                    COALESCE(SUM(stock_quantity), 0)::BIGINT AS units_in_stock, \
                    COUNT(*) FILTER (WHERE stock_quantity = 0) AS out_of_stock \
             FROM products",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }

    async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("board"), "board");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
