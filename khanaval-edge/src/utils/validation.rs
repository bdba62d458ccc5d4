//! Input validation helpers for printer settings

use shared::models::{ConnectionType, PrinterConfig};

/// Printer names shorter than this are rejected
pub const MIN_PRINTER_NAME_LEN: usize = 2;

/// Printer names longer than this do not fit a ticket header
pub const MAX_PRINTER_NAME_LEN: usize = 64;

/// Validate that a required string is non-empty and within the length limits.
pub fn validate_required_text(
    value: &str,
    field: &str,
    min_len: usize,
    max_len: usize,
) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(format!("{field} must not be empty"));
    }
    if len < min_len {
        return Err(format!("{field} must be at least {min_len} characters"));
    }
    if len > max_len {
        return Err(format!("{field} is too long ({len} chars, max {max_len})"));
    }
    Ok(())
}

/// Validate a printer form before it is written to the registry
pub fn validate_printer(config: &PrinterConfig) -> Result<(), String> {
    validate_required_text(
        &config.name,
        "Printer name",
        MIN_PRINTER_NAME_LEN,
        MAX_PRINTER_NAME_LEN,
    )?;

    let missing = |field: &Option<String>| field.as_deref().is_none_or(|v| v.trim().is_empty());
    match config.connection_type {
        ConnectionType::Network if missing(&config.ip_address) => {
            Err("IP address is required for network printers".to_string())
        }
        ConnectionType::Bluetooth if missing(&config.bluetooth_id) => {
            Err("Bluetooth device ID is required for Bluetooth printers".to_string())
        }
        _ => {
            if let Some(uuid) = config.service_uuid.as_deref().filter(|u| !u.trim().is_empty())
                && uuid::Uuid::parse_str(uuid.trim()).is_err()
            {
                return Err(format!("Invalid GATT service UUID: {uuid}"));
            }
            if let Some(uuid) = config
                .characteristic_uuid
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                && uuid::Uuid::parse_str(uuid.trim()).is_err()
            {
                return Err(format!("Invalid GATT characteristic UUID: {uuid}"));
            }
            Ok(())
        }
    }
}
