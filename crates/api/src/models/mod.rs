//! Domain models for the API.
//!
//! Domain types are validated and separate from the database row types in
//! `crate::db`. Request and response bodies live next to the type they
//! describe.

pub mod product;
pub mod session;
pub mod user;

pub use product::{
    CustomizationOption, NewProduct, Product, ProductQuery, ProductSort, ProductUpdate,
    ValidationError,
};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserResponse};
