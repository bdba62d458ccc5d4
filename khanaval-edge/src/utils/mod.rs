//! Utilities - logging, validation and time helpers

pub mod logger;
pub mod time;
pub mod validation;
