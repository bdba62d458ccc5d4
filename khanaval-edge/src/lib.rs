//! Khanaval Edge - restaurant print pipeline
//!
//! # Overview
//!
//! Everything between "an order was placed" and "paper came out":
//!
//! - **Content** (`content`): kitchen tickets, bills, inventory, attendance
//!   and sales reports as plain receipt text
//! - **Printing** (`printing`): printer registry, Bluetooth / network / USB
//!   transports and the print orchestrator
//! - **Core** (`core`): environment configuration
//!
//! Byte-level work (ESC/POS, encoding, chunked writes, device adapters)
//! lives in `khanaval-printer`.
//!
//! # Module layout
//!
//! ```text
//! khanaval-edge/src/
//! ├── core/          # Config, environment errors
//! ├── content/       # Ticket, bill and report generators
//! ├── printing/      # Registry, transports, PrintService, notifications
//! └── utils/         # Logging, time, validation
//! ```

pub mod content;
pub mod core;
pub mod printing;
pub mod utils;

// Re-export public types
pub use content::{CatalogMode, ContentError, DocumentOptions};
pub use core::{Config, ConfigError};
pub use printing::{PrintService, PrinterRegistry, TransportSet};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

use std::path::Path;

/// Load `.env`, create the working directories and start logging
///
/// Returns the configuration read from the environment.
pub fn setup_environment() -> Result<Config, ConfigError> {
    // A missing .env is fine
    let _ = dotenv::dotenv();
    let config = Config::from_env();

    std::fs::create_dir_all(&config.work_dir).map_err(|source| ConfigError::WorkDir {
        path: config.work_dir.clone(),
        source,
    })?;
    if let Some(parent) = Path::new(&config.printers_file).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::WorkDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    std::fs::create_dir_all(&config.log_dir).map_err(|source| ConfigError::LogDir {
        path: config.log_dir.clone(),
        source,
    })?;

    init_logger_with_file(Some(&config.log_level), Some(&config.log_dir));
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
 _  __ _                                         _
| |/ /| |__    __ _  _ __    __ _ __   __  __ _ | |
| ' / | '_ \  / _` || '_ \  / _` |\ \ / / / _` || |
| . \ | | | || (_| || | | || (_| | \ V / | (_| || |
|_|\_\|_| |_| \__,_||_| |_| \__,_|  \_/   \__,_||_|
                              print edge
    "#
    );
}
