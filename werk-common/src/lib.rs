//! # Werk Common Library
//!
//! Shared code for the Werk services including:
//! - Database schema creation and row models
//! - Password hashing and session token generation
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
