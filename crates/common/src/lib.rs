//! Shared utilities, configuration, and error handling for Retiro
//!
//! This crate provides common functionality used across the Retiro application:
//! - Configuration management following 12-factor principles
//! - Error taxonomy and HTTP response mapping
//! - State-machine error types shared by the domain crates
//! - Custom axum extractors

pub mod config;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
pub use state::StateError;
