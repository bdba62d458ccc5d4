//! Core module - configuration and environment setup
//!
//! - [`Config`] - edge node configuration
//! - [`ConfigError`] - environment setup failures

pub mod config;
pub mod error;

pub use config::Config;
pub use error::ConfigError;
