//! Printer configuration model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ParseEnumError;

/// Generic printer GATT service (default for most BLE thermal printers)
pub const DEFAULT_BLE_SERVICE_UUID: &str = "000018f0-0000-1000-8000-00805f9b34fb";

/// Write characteristic under the generic printer service
pub const DEFAULT_BLE_CHARACTERISTIC_UUID: &str = "00002af1-0000-1000-8000-00805f9b34fb";

/// Physical transport used to reach a printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Usb,
    Network,
    Bluetooth,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usb => "usb",
            Self::Network => "network",
            Self::Bluetooth => "bluetooth",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usb" => Ok(Self::Usb),
            "network" => Ok(Self::Network),
            "bluetooth" => Ok(Self::Bluetooth),
            other => Err(ParseEnumError::new("connection type", other)),
        }
    }
}

/// Thermal paper roll width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaperWidth {
    #[serde(rename = "58mm")]
    Mm58,
    #[default]
    #[serde(rename = "80mm")]
    Mm80,
}

impl PaperWidth {
    /// Characters per line in the printer's default font
    ///
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn columns(&self) -> usize {
        match self {
            Self::Mm58 => 32,
            Self::Mm80 => 48,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mm58 => "58mm",
            Self::Mm80 => "80mm",
        }
    }
}

/// Logical print destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterLocation {
    Kitchen,
    Billing,
    Inventory,
}

impl PrinterLocation {
    pub const ALL: [PrinterLocation; 3] = [Self::Kitchen, Self::Billing, Self::Inventory];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Billing => "billing",
            Self::Inventory => "inventory",
        }
    }
}

impl fmt::Display for PrinterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrinterLocation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kitchen" => Ok(Self::Kitchen),
            "billing" => Ok(Self::Billing),
            "inventory" => Ok(Self::Inventory),
            other => Err(ParseEnumError::new("printer location", other)),
        }
    }
}

/// Observed printer state, refreshed by a connectivity probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterStatus {
    Online,
    #[default]
    Offline,
    Error,
}

/// Character set the printer firmware expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterCharset {
    /// Raw UTF-8 bytes (firmware with a UTF-8 code page)
    #[default]
    Utf8,
    /// Windows-1252 / Latin-1 code page
    Latin1,
}

/// Printer configuration (one row of the printer registry)
///
/// `name` + `connection_type` identify a printer. `status` is observed at
/// runtime and never written back to the registry file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterConfig {
    pub name: String,
    pub connection_type: ConnectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bluetooth_id: Option<String>,
    #[serde(default)]
    pub paper_width: PaperWidth,
    pub location: PrinterLocation,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing)]
    pub status: PrinterStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_connected: Option<DateTime<Utc>>,
    /// GATT service override for printer firmwares that do not use the generic service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic_uuid: Option<String>,
    #[serde(default)]
    pub charset: PrinterCharset,
}

fn default_true() -> bool {
    true
}

impl PrinterConfig {
    /// Network printer reachable at `ip_address`
    pub fn network(name: &str, ip_address: &str, location: PrinterLocation) -> Self {
        Self {
            ip_address: Some(ip_address.to_string()),
            ..Self::base(name, ConnectionType::Network, location)
        }
    }

    /// Bluetooth printer paired under `bluetooth_id`
    pub fn bluetooth(name: &str, bluetooth_id: &str, location: PrinterLocation) -> Self {
        Self {
            bluetooth_id: Some(bluetooth_id.to_string()),
            ..Self::base(name, ConnectionType::Bluetooth, location)
        }
    }

    /// USB printer (device is picked per print)
    pub fn usb(name: &str, location: PrinterLocation) -> Self {
        Self::base(name, ConnectionType::Usb, location)
    }

    fn base(name: &str, connection_type: ConnectionType, location: PrinterLocation) -> Self {
        Self {
            name: name.to_string(),
            connection_type,
            ip_address: None,
            bluetooth_id: None,
            paper_width: PaperWidth::default(),
            location,
            is_default: false,
            enabled: true,
            status: PrinterStatus::default(),
            last_connected: None,
            service_uuid: None,
            characteristic_uuid: None,
            charset: PrinterCharset::default(),
        }
    }

    /// Mark as the default printer for its location
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_paper_width(mut self, width: PaperWidth) -> Self {
        self.paper_width = width;
        self
    }

    pub fn key(&self) -> PrinterKey {
        PrinterKey {
            name: self.name.clone(),
            connection_type: self.connection_type,
        }
    }

    /// GATT service UUID, falling back to the generic printer service
    pub fn ble_service_uuid(&self) -> &str {
        self.service_uuid
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_BLE_SERVICE_UUID)
    }

    /// GATT write characteristic UUID, falling back to the generic one
    pub fn ble_characteristic_uuid(&self) -> &str {
        self.characteristic_uuid
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_BLE_CHARACTERISTIC_UUID)
    }

    /// Transport address for display and device locking
    pub fn address_label(&self) -> String {
        match self.connection_type {
            ConnectionType::Network => self.ip_address.clone().unwrap_or_default(),
            ConnectionType::Bluetooth => self.bluetooth_id.clone().unwrap_or_default(),
            ConnectionType::Usb => "usb".to_string(),
        }
    }
}

/// Identity of a printer inside the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrinterKey {
    pub name: String,
    pub connection_type: ConnectionType,
}

impl fmt::Display for PrinterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.connection_type, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_json_loads() {
        let json = r#"[{
            "name": "Kitchen BT",
            "connectionType": "bluetooth",
            "bluetoothId": "AA:BB:CC:DD:EE:FF",
            "isDefault": true,
            "paperWidth": "58mm",
            "enabled": true,
            "location": "kitchen",
            "status": "online"
        }]"#;

        let printers: Vec<PrinterConfig> = serde_json::from_str(json).unwrap();
        assert_eq!(printers.len(), 1);
        let p = &printers[0];
        assert_eq!(p.connection_type, ConnectionType::Bluetooth);
        assert_eq!(p.paper_width, PaperWidth::Mm58);
        assert_eq!(p.location, PrinterLocation::Kitchen);
        assert_eq!(p.status, PrinterStatus::Online);
        assert_eq!(p.charset, PrinterCharset::Utf8);
    }

    #[test]
    fn test_status_not_serialized() {
        let mut p = PrinterConfig::network("Bill", "10.0.0.5", PrinterLocation::Billing);
        p.status = PrinterStatus::Online;

        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("status").is_none());
        assert_eq!(json["connectionType"], "network");
        assert_eq!(json["ipAddress"], "10.0.0.5");
        assert_eq!(json["paperWidth"], "80mm");
    }

    #[test]
    fn test_ble_uuid_defaults() {
        let mut p = PrinterConfig::bluetooth("BT", "id-1", PrinterLocation::Kitchen);
        assert_eq!(p.ble_service_uuid(), DEFAULT_BLE_SERVICE_UUID);
        assert_eq!(p.ble_characteristic_uuid(), DEFAULT_BLE_CHARACTERISTIC_UUID);

        p.service_uuid = Some("0000ff00-0000-1000-8000-00805f9b34fb".to_string());
        p.characteristic_uuid = Some("  ".to_string());
        assert_eq!(p.ble_service_uuid(), "0000ff00-0000-1000-8000-00805f9b34fb");
        assert_eq!(p.ble_characteristic_uuid(), DEFAULT_BLE_CHARACTERISTIC_UUID);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Kitchen".parse::<PrinterLocation>().unwrap(), PrinterLocation::Kitchen);
        assert_eq!("usb".parse::<ConnectionType>().unwrap(), ConnectionType::Usb);
        assert!("serial".parse::<ConnectionType>().is_err());
        assert_eq!(PaperWidth::Mm58.columns(), 32);
        assert_eq!(PaperWidth::Mm80.columns(), 48);
    }
}
