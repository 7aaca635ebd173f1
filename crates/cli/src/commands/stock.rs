//! Stock repair commands.
//!
//! ```bash
//! bazaar-cli stock set --product-id 12 --quantity 40
//! bazaar-cli stock adjust --product-id 12 --delta -3
//! bazaar-cli stock restock --quantity 25
//! bazaar-cli stock report --threshold 5
//! ```

use bazaar_api::db::{ProductRepository, RepositoryError};
use bazaar_core::ProductId;

use super::{CommandError, connect};

fn non_negative(argument: &str, value: i32) -> Result<(), CommandError> {
    if value < 0 {
        return Err(CommandError::InvalidArgument(format!(
            "{argument} must be zero or more, got {value}"
        )));
    }
    Ok(())
}

fn product_not_found(id: ProductId) -> impl FnOnce(RepositoryError) -> CommandError {
    move |err| match err {
        RepositoryError::NotFound => CommandError::NotFound(format!("product {id}")),
        other => other.into(),
    }
}

/// Set the absolute stock level of one product.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a negative quantity and
/// `CommandError::NotFound` for an unknown product.
pub async fn set(id: ProductId, quantity: i32) -> Result<(), CommandError> {
    non_negative("quantity", quantity)?;
    let pool = connect().await?;

    let product = ProductRepository::new(&pool)
        .set_stock(id, quantity)
        .await
        .map_err(product_not_found(id))?;

    tracing::info!(
        "Stock for #{} \"{}\" set to {}",
        product.id,
        product.name,
        product.stock_quantity
    );
    Ok(())
}

/// Change the stock level of one product by `delta`.
///
/// # Errors
///
/// Returns `CommandError::Repository` with a conflict if stock would drop
/// below zero.
pub async fn adjust(id: ProductId, delta: i32) -> Result<(), CommandError> {
    let pool = connect().await?;

    let product = ProductRepository::new(&pool)
        .adjust_stock(id, delta)
        .await
        .map_err(product_not_found(id))?;

    tracing::info!(
        "Stock for #{} \"{}\" changed by {} to {}",
        product.id,
        product.name,
        delta,
        product.stock_quantity
    );
    Ok(())
}

/// Give every out-of-stock product `quantity` units.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a negative quantity.
pub async fn restock(quantity: i32, include_inactive: bool) -> Result<(), CommandError> {
    non_negative("quantity", quantity)?;
    let pool = connect().await?;

    let restocked = ProductRepository::new(&pool)
        .restock_empty(quantity, include_inactive)
        .await?;

    tracing::info!("Restocked {restocked} product(s) to {quantity} units");
    Ok(())
}

/// List products at or below `threshold` units.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a negative threshold.
pub async fn report(threshold: i32) -> Result<(), CommandError> {
    non_negative("threshold", threshold)?;
    let pool = connect().await?;

    let products = ProductRepository::new(&pool).low_stock(threshold).await?;

    if products.is_empty() {
        tracing::info!("No products at or below {threshold} units");
        return Ok(());
    }

    tracing::info!("Products at or below {threshold} units:");
    for product in &products {
        tracing::info!(
            "  #{:<6} {:>5} units  {}{}",
            product.id,
            product.stock_quantity,
            product.name,
            if product.is_active { "" } else { " (inactive)" }
        );
    }
    tracing::info!("{} product(s)", products.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative() {
        assert!(non_negative("quantity", 0).is_ok());
        assert!(non_negative("quantity", 12).is_ok());
        assert!(matches!(
            non_negative("quantity", -1),
            Err(CommandError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_report_names_threshold() {
        let err = report(-2).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: threshold must be zero or more, got -2"
        );

        let err = restock(-3, false).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: quantity must be zero or more, got -3"
        );
    }

    #[test]
    fn test_not_found_mapping() {
        let err = product_not_found(ProductId::new(7))(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "Not found: product 7");

        let err = product_not_found(ProductId::new(7))(RepositoryError::Conflict(
            "insufficient stock".to_string(),
        ));
        assert!(matches!(err, CommandError::Repository(_)));
    }
}
