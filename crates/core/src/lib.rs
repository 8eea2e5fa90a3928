//! Teahouse Core - Shared types library.
//!
//! This crate provides common types used across all Teahouse components:
//! - `server` - JSON API for teas, comments and users
//! - `cli` - Seeding and maintenance commands
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encoding for the newtypes is opt-in via the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for entity IDs, usernames and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
