//! Product domain types, request bodies and validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{Price, ProductId, UserId};

const MAX_NAME_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 5000;
const MAX_CATEGORY_LENGTH: usize = 100;
const MAX_IMAGES: usize = 10;
const MAX_IMAGE_URL_LENGTH: usize = 2048;
const MAX_OPTIONS: usize = 20;
const MAX_OPTION_VALUES: usize = 50;
const MAX_OPTION_TEXT_LENGTH: usize = 50;

/// Default page size for product listings.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A request field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as it appears in the JSON body.
    pub field: &'static str,
    /// Human readable reason.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A choice the shopper makes when ordering (e.g. size or engraving color).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationOption {
    /// Label shown to the shopper.
    pub name: String,
    /// Allowed values.
    pub values: Vec<String>,
}

/// Aggregated customer ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingSummary {
    /// Mean score rounded to two decimals, zero when unrated.
    pub average: Decimal,
    /// Number of ratings received.
    pub count: i32,
}

impl RatingSummary {
    /// Summarize `count` ratings whose scores add up to `sum`.
    ///
    /// The average is derived from the exact totals on every read, so it
    /// never accumulates rounding error. It always carries two decimals.
    #[must_use]
    pub fn from_totals(sum: i64, count: i32) -> Self {
        let mut average = Decimal::from(sum)
            .checked_div(Decimal::from(count))
            .map_or(Decimal::ZERO, |avg| avg.round_dp(2));
        average.rescale(2);
        Self { average, count }
    }
}

/// A catalog entry (domain type, also the JSON response body).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub images: Vec<String>,
    pub stock_quantity: i32,
    /// Account that listed the product; `None` once that account is deleted.
    pub seller_id: Option<UserId>,
    pub customization_options: Vec<CustomizationOption>,
    pub rating: RatingSummary,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub customization_options: Vec<CustomizationOption>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl NewProduct {
    /// Trim text fields and check every constraint.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = validate_name(&self.name)?;
        self.description = validate_description(&self.description)?;
        self.category = validate_category(&self.category)?;
        validate_stock(self.stock_quantity)?;
        self.images = validate_images(self.images)?;
        self.customization_options = validate_options(self.customization_options)?;
        Ok(self)
    }
}

/// Body of `PUT /api/products/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub stock_quantity: Option<i32>,
    pub customization_options: Option<Vec<CustomizationOption>>,
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    /// Trim and check the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered, or one naming the
    /// whole body if no field is present.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::new("body", "no fields to update"));
        }
        if let Some(stock) = self.stock_quantity {
            validate_stock(stock)?;
        }
        Ok(Self {
            name: self.name.as_deref().map(validate_name).transpose()?,
            description: self
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
            category: self.category.as_deref().map(validate_category).transpose()?,
            images: self.images.map(validate_images).transpose()?,
            customization_options: self
                .customization_options
                .map(validate_options)
                .transpose()?,
            ..self
        })
    }

    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.images.is_none()
            && self.stock_quantity.is_none()
            && self.customization_options.is_none()
            && self.is_active.is_none()
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

impl ProductSort {
    /// SQL `ORDER BY` clause body. Ties are broken by id for stable paging.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC, id DESC",
            Self::PriceAsc => "price ASC, id ASC",
            Self::PriceDesc => "price DESC, id DESC",
            Self::Rating => {
                "rating_sum::NUMERIC / NULLIF(rating_count, 0) DESC NULLS LAST, \
                 rating_count DESC, id DESC"
            }
        }
    }
}

/// Query string of `GET /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub sort: ProductSort,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Include deactivated products (honored for admins only).
    #[serde(default)]
    pub include_inactive: bool,
}

impl ProductQuery {
    /// Check bounds and fill in paging defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for out-of-range paging or an inverted
    /// price range.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ValidationError::new(
                "limit",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ValidationError::new("offset", "cannot be negative"));
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(ValidationError::new(
                "min_price",
                "cannot be greater than max_price",
            ));
        }
        self.limit = Some(limit);
        self.offset = Some(offset);
        self.category = self.category.map(|c| c.trim().to_owned()).filter(|c| !c.is_empty());
        self.search = self.search.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
        Ok(self)
    }
}

// =============================================================================
// Field validators
// =============================================================================

fn validate_name(name: &str) -> Result<String, ValidationError> {
    required_text("name", name, MAX_NAME_LENGTH)
}

fn validate_category(category: &str) -> Result<String, ValidationError> {
    required_text("category", category, MAX_CATEGORY_LENGTH)
}

fn validate_description(description: &str) -> Result<String, ValidationError> {
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::new(
            "description",
            format!("must be at most {MAX_DESCRIPTION_LENGTH} characters"),
        ));
    }
    Ok(description.to_owned())
}

fn validate_stock(stock_quantity: i32) -> Result<(), ValidationError> {
    if stock_quantity < 0 {
        return Err(ValidationError::new("stock_quantity", "cannot be negative"));
    }
    Ok(())
}

fn validate_images(images: Vec<String>) -> Result<Vec<String>, ValidationError> {
    if images.len() > MAX_IMAGES {
        return Err(ValidationError::new(
            "images",
            format!("at most {MAX_IMAGES} images allowed"),
        ));
    }
    images
        .into_iter()
        .map(|url| {
            let url = url.trim().to_owned();
            let scheme_ok = url.starts_with("https://")
                || url.starts_with("http://")
                || url.starts_with('/');
            if url.is_empty() || url.len() > MAX_IMAGE_URL_LENGTH || !scheme_ok {
                return Err(ValidationError::new(
                    "images",
                    "each image must be an http(s) URL or an absolute path",
                ));
            }
            Ok(url)
        })
        .collect()
}

fn validate_options(
    options: Vec<CustomizationOption>,
) -> Result<Vec<CustomizationOption>, ValidationError> {
    if options.len() > MAX_OPTIONS {
        return Err(ValidationError::new(
            "customization_options",
            format!("at most {MAX_OPTIONS} options allowed"),
        ));
    }
    options
        .into_iter()
        .map(|option| {
            let name =
                required_text("customization_options", &option.name, MAX_OPTION_TEXT_LENGTH)?;
            if option.values.is_empty() || option.values.len() > MAX_OPTION_VALUES {
                return Err(ValidationError::new(
                    "customization_options",
                    format!("option '{name}' needs between 1 and {MAX_OPTION_VALUES} values"),
                ));
            }
            let values = option
                .values
                .iter()
                .map(|v| required_text("customization_options", v, MAX_OPTION_TEXT_LENGTH))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CustomizationOption { name, values })
        })
        .collect()
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "cannot be empty"));
    }
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(value.to_owned())
}
