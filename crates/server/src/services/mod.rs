//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, password login, password hashing

pub mod auth;
