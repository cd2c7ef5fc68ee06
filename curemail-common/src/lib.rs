//! # Curemail Common Library
//!
//! Shared code for the curemail enrichment services including:
//! - Domain and wire types (papers, authors, scrape request/response)
//! - Email cache and scrape job database access
//! - The synthetic email deriver (single source of truth for both the
//!   client resolver and the scrape service)
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod synth;
pub mod types;

pub use error::{Error, Result};
pub use synth::derive_email;
