//! # Folio Common Library
//!
//! Shared code for the Folio gallery services:
//! - Database initialization, migrations and the `Painting` model
//! - Configuration loading (CLI > environment > TOML > compiled default)
//! - Common error type
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
