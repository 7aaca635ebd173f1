//! Seed the catalog from a YAML file.
//!
//! ```bash
//! bazaar-cli seed products -f demos/products.yaml --seller-email admin@example.com
//! ```
//!
//! File shape:
//!
//! ```yaml
//! products:
//!   - name: Walnut Desk Organizer
//!     description: Hand-finished, three compartments.
//!     price: "49.00"
//!     category: home
//!     stock_quantity: 12
//!     images: ["https://cdn.example.com/organizer.jpg"]
//!     customization_options:
//!       - name: Engraving
//!         values: [none, initials]
//! ```

use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;

use bazaar_api::db::ProductRepository;
use bazaar_api::models::{NewProduct, Product};
use bazaar_api::services::auth::AuthService;
use bazaar_core::UserId;

use super::{CommandError, connect};

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<NewProduct>,
}

/// Parse and validate every product in a seed document.
///
/// Nothing is written unless the whole file is valid.
fn parse(content: &str) -> Result<Vec<NewProduct>, CommandError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    if file.products.is_empty() {
        return Err(CommandError::InvalidArgument(
            "seed file lists no products".to_string(),
        ));
    }

    file.products
        .into_iter()
        .enumerate()
        .map(|(index, product)| {
            product.validate().map_err(|err| {
                CommandError::InvalidArgument(format!("product #{}: {err}", index + 1))
            })
        })
        .collect()
}

/// Insert the products described in `file_path`, listed by `seller_email`.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, the seller doesn't
/// exist, or an insert fails.
pub async fn products(
    file_path: &Path,
    seller_email: &str,
    dry_run: bool,
) -> Result<(), CommandError> {
    if !file_path.exists() {
        return Err(CommandError::NotFound(format!(
            "seed file {}",
            file_path.display()
        )));
    }

    tracing::info!(path = %file_path.display(), "Loading products from file");

    // Validate before connecting so a typo never leaves a half-seeded catalog
    let content = tokio::fs::read_to_string(file_path).await?;
    let products = parse(&content)?;
    tracing::info!(count = products.len(), "Seed file validated");

    if dry_run {
        tracing::info!("Dry run: nothing written");
        return Ok(());
    }

    let pool = connect().await?;
    let seller = AuthService::new(&pool)
        .get_user_by_email(seller_email)
        .await?;

    let created = insert_all(&pool, &products, seller.id).await?;
    for product in &created {
        tracing::info!("  #{:<6} {} ({})", product.id, product.name, product.price);
    }

    tracing::info!(
        "Seeding complete! {} product(s) listed by {}",
        created.len(),
        seller.email
    );
    pool.close().await;
    Ok(())
}

/// Insert `products` in one transaction; any failure leaves the catalog untouched.
async fn insert_all(
    pool: &PgPool,
    products: &[NewProduct],
    seller_id: UserId,
) -> Result<Vec<Product>, CommandError> {
    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(products.len());
    for product in products {
        let product = ProductRepository::create_in(&mut *tx, product, Some(seller_id)).await?;
        created.push(product);
    }
    tx.commit().await?;
    Ok(created)
}
