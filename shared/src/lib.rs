//! Shared types for the Khanaval restaurant print pipeline
//!
//! Data model used by both the printer library and the edge application:
//! printer configurations, print jobs and outcomes, orders, the menu
//! catalog, inventory and attendance records.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use models::*;
