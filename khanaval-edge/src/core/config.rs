use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use khanaval_printer::ChunkPlan;

use crate::content::CatalogMode;

/// Edge node configuration
///
/// # Environment variables
///
/// Every value can be overridden through the environment (or `.env`):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/khanaval | Working directory (registry, logs) |
/// | PRINTERS_FILE | $WORK_DIR/printers.json | Printer registry file |
/// | LOG_LEVEL | info | tracing level |
/// | LOG_DIR | $WORK_DIR/logs | Daily rolling log files (stdout if missing) |
/// | TIMEZONE | Asia/Kolkata | Timestamps on tickets and reports |
/// | CATALOG_MODE | lenient | `lenient` skips unknown menu items, `strict` rejects them |
/// | RESTAURANT_NAME | JAYESH MACHHI KHANAVAL | Header of tickets and bills |
/// | NETWORK_PROBE_TIMEOUT_MS | 3000 | HEAD probe timeout for network printers |
/// | BLE_SCAN_TIMEOUT_MS | 5000 | Bluetooth scan window |
/// | BLE_CHUNK_SIZE | 512 | Bytes per GATT write |
/// | BLE_CHUNK_DELAY_MS | 100 | Pause between GATT writes |
/// | USB_CHUNK_SIZE | 64 | Bytes per bulk transfer |
/// | USB_CHUNK_DELAY_MS | 50 | Pause between bulk transfers |
///
/// Unparseable values fall back to the default with a warning.
///
/// # Example
///
/// ```ignore
/// WORK_DIR=./data CATALOG_MODE=strict cargo run -- print billing bill.txt
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub printers_file: String,
    pub log_level: String,
    pub log_dir: String,
    pub timezone: Tz,
    pub catalog_mode: CatalogMode,
    pub restaurant_name: String,
    pub network_probe_timeout_ms: u64,
    pub ble_scan_timeout_ms: u64,
    pub ble_chunk_size: usize,
    pub ble_chunk_delay_ms: u64,
    pub usb_chunk_size: usize,
    pub usb_chunk_delay_ms: u64,
}

pub const DEFAULT_RESTAURANT_NAME: &str = "JAYESH MACHHI KHANAVAL";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let work_dir = lookup("WORK_DIR").unwrap_or_else(|| "/var/lib/khanaval".into());
        let printers_file =
            lookup("PRINTERS_FILE").unwrap_or_else(|| format!("{work_dir}/printers.json"));
        let log_dir = lookup("LOG_DIR").unwrap_or_else(|| format!("{work_dir}/logs"));

        Self {
            printers_file,
            log_dir,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            timezone: parse_or(&lookup, "TIMEZONE", chrono_tz::Asia::Kolkata),
            catalog_mode: parse_or(&lookup, "CATALOG_MODE", CatalogMode::Lenient),
            restaurant_name: lookup("RESTAURANT_NAME")
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RESTAURANT_NAME.into()),
            network_probe_timeout_ms: parse_or(&lookup, "NETWORK_PROBE_TIMEOUT_MS", 3000),
            ble_scan_timeout_ms: parse_or(&lookup, "BLE_SCAN_TIMEOUT_MS", 5000),
            ble_chunk_size: positive_or(&lookup, "BLE_CHUNK_SIZE", 512),
            ble_chunk_delay_ms: parse_or(&lookup, "BLE_CHUNK_DELAY_MS", 100),
            usb_chunk_size: positive_or(&lookup, "USB_CHUNK_SIZE", 64),
            usb_chunk_delay_ms: parse_or(&lookup, "USB_CHUNK_DELAY_MS", 50),
            work_dir,
        }
    }

    /// Defaults rooted at `work_dir`, ignoring the environment
    ///
    /// Used by tests
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let work_dir = work_dir.into();
        Self::from_lookup(|key| (key == "WORK_DIR").then(|| work_dir.clone()))
    }

    pub fn printers_path(&self) -> PathBuf {
        PathBuf::from(&self.printers_file)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.network_probe_timeout_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.ble_scan_timeout_ms)
    }

    pub fn ble_plan(&self) -> ChunkPlan {
        ChunkPlan::new(
            self.ble_chunk_size,
            Duration::from_millis(self.ble_chunk_delay_ms),
        )
    }

    pub fn usb_plan(&self) -> ChunkPlan {
        ChunkPlan::new(
            self.usb_chunk_size,
            Duration::from_millis(self.usb_chunk_delay_ms),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Invalid config value, using default");
                default
            }
        },
        None => default,
    }
}

fn positive_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> usize {
    match parse_or(lookup, key, default) {
        0 => {
            tracing::warn!(key, "Chunk size must be positive, using default");
            default
        }
        n => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.work_dir, "/var/lib/khanaval");
        assert_eq!(config.printers_file, "/var/lib/khanaval/printers.json");
        assert_eq!(config.timezone, chrono_tz::Asia::Kolkata);
        assert_eq!(config.catalog_mode, CatalogMode::Lenient);
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
        assert_eq!(config.ble_plan(), ChunkPlan::BLUETOOTH);
        assert_eq!(config.usb_plan(), ChunkPlan::USB);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("WORK_DIR", "/tmp/khanaval"),
            ("TIMEZONE", "Asia/Dubai"),
            ("CATALOG_MODE", "strict"),
            ("BLE_CHUNK_SIZE", "180"),
            ("RESTAURANT_NAME", "Sea Shell"),
        ]));
        assert_eq!(config.printers_file, "/tmp/khanaval/printers.json");
        assert_eq!(config.log_dir, "/tmp/khanaval/logs");
        assert_eq!(config.timezone, chrono_tz::Asia::Dubai);
        assert_eq!(config.catalog_mode, CatalogMode::Strict);
        assert_eq!(config.ble_chunk_size, 180);
        assert_eq!(config.restaurant_name, "Sea Shell");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("TIMEZONE", "Mars/Olympus"),
            ("USB_CHUNK_SIZE", "0"),
            ("BLE_CHUNK_DELAY_MS", "soon"),
        ]));
        assert_eq!(config.timezone, chrono_tz::Asia::Kolkata);
        assert_eq!(config.usb_chunk_size, 64);
        assert_eq!(config.ble_chunk_delay_ms, 100);
    }
}
