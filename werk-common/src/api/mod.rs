//! Shared authentication primitives
//!
//! # Design Principle
//!
//! This module contains ONLY pure functions. The web crate wraps them with
//! cookie handling and session storage.

pub mod auth;

pub use auth::{generate_session_token, hash_password, verify_password, PasswordHash};
