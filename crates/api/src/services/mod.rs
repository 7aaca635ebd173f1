//! Business logic services.
//!
//! - `auth` - Registration, login, password hashing and role management

pub mod auth;
