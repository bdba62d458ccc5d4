//! Data models
//!
//! JSON field names are camelCase so files written by the browser build
//! of the application load unchanged.

pub mod attendance;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod print_job;
pub mod printer;
pub mod sales;

// Re-exports
pub use attendance::*;
pub use inventory::*;
pub use menu::*;
pub use order::*;
pub use print_job::*;
pub use printer::*;
pub use sales::*;

use thiserror::Error;

/// Unknown textual value for one of the model enums
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
