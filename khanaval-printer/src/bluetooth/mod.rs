//! Bluetooth LE printer adapter
//!
//! Discovery picks a single device per call, the way a platform device
//! chooser does. A scan that ends without a match is [`Discovery::Cancelled`],
//! not an error. Connected handles are cached in a [`ConnectionRegistry`]
//! keyed by device id and aliased by printer identity.

#[cfg(feature = "ble")]
mod btle;

#[cfg(feature = "ble")]
pub use btle::BtleplugBackend;

use crate::chunk::{ChunkPlan, write_chunked};
use crate::connection::ConnectionRegistry;
use crate::error::{PrintError, PrintResult};
use crate::printer::Printer;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Generic printer GATT service
pub const DEFAULT_SERVICE_UUID: Uuid = Uuid::from_u128(0x000018f0_0000_1000_8000_00805f9b34fb);
/// Write characteristic of the generic printer service
pub const DEFAULT_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x00002af1_0000_1000_8000_00805f9b34fb);

/// Name prefixes thermal printers commonly advertise
pub const PRINTER_NAME_PREFIXES: [&str; 4] = ["Printer", "POS", "ESC", "BT"];

pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(5);

/// A device seen during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Platform id (MAC address on Linux/Windows)
    pub id: String,
    pub name: Option<String>,
    pub services: Vec<Uuid>,
    pub rssi: Option<i16>,
}

/// Which advertised devices count as printers
///
/// A device matches if it advertises any listed service or its name starts
/// with any listed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFilter {
    pub services: Vec<Uuid>,
    pub name_prefixes: Vec<String>,
    /// Preferred device; wins over other matches when present
    pub device_id: Option<String>,
}

impl DeviceFilter {
    /// Any printer: generic service or a known name prefix
    pub fn printers() -> Self {
        Self {
            services: vec![DEFAULT_SERVICE_UUID],
            name_prefixes: PRINTER_NAME_PREFIXES.iter().map(|p| p.to_string()).collect(),
            device_id: None,
        }
    }

    /// One configured printer
    pub fn for_target(target: &BleTarget) -> Self {
        Self {
            services: vec![target.service],
            name_prefixes: vec![target.name.clone()],
            device_id: Some(target.device_id.clone()),
        }
    }

    pub fn matches(&self, device: &DeviceInfo) -> bool {
        if self.device_id.as_deref() == Some(device.id.as_str()) {
            return true;
        }
        if device.services.iter().any(|s| self.services.contains(s)) {
            return true;
        }
        match &device.name {
            Some(name) => self
                .name_prefixes
                .iter()
                .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str())),
            None => false,
        }
    }
}

/// Result of a single-device discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    Found(DeviceInfo),
    /// Nothing selected; not a failure
    Cancelled,
}

/// Platform Bluetooth central
#[async_trait]
pub trait BleBackend: Send + Sync {
    /// Scan for `timeout` and report everything advertised
    async fn scan(&self, timeout: Duration) -> PrintResult<Vec<DeviceInfo>>;

    /// Resolve a device id seen in a scan to a handle (not yet connected)
    async fn device(&self, device_id: &str) -> PrintResult<Arc<dyn BleDevice>>;
}

/// One peripheral
#[async_trait]
pub trait BleDevice: Send + Sync {
    fn id(&self) -> &str;

    async fn is_connected(&self) -> bool;

    /// Connect (or reconnect) and discover GATT services
    async fn connect(&self) -> PrintResult<()>;

    /// Write one chunk to `characteristic` of `service`
    async fn write(&self, service: Uuid, characteristic: Uuid, data: &[u8]) -> PrintResult<()>;
}

/// Host without a usable Bluetooth stack
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBle;

#[async_trait]
impl BleBackend for UnavailableBle {
    async fn scan(&self, _timeout: Duration) -> PrintResult<Vec<DeviceInfo>> {
        Err(unsupported())
    }

    async fn device(&self, _device_id: &str) -> PrintResult<Arc<dyn BleDevice>> {
        Err(unsupported())
    }
}

fn unsupported() -> PrintError {
    PrintError::Unsupported("Bluetooth LE is not available on this host".to_string())
}

/// Scan once and pick one matching device
///
/// The preferred device id wins; otherwise the strongest signal.
#[instrument(skip(backend, filter))]
pub async fn discover_one(
    backend: &dyn BleBackend,
    filter: &DeviceFilter,
    timeout: Duration,
) -> PrintResult<Discovery> {
    let mut candidates: Vec<DeviceInfo> = backend
        .scan(timeout)
        .await?
        .into_iter()
        .filter(|d| filter.matches(d))
        .collect();

    if let Some(id) = filter.device_id.as_deref()
        && let Some(pos) = candidates.iter().position(|d| d.id == id)
    {
        let device = candidates.swap_remove(pos);
        info!(id = %device.id, name = ?device.name, "Bluetooth device selected");
        return Ok(Discovery::Found(device));
    }

    candidates.sort_by_key(|d| std::cmp::Reverse(d.rssi.unwrap_or(i16::MIN)));
    match candidates.into_iter().next() {
        Some(device) => {
            info!(id = %device.id, name = ?device.name, "Bluetooth device selected");
            Ok(Discovery::Found(device))
        }
        None => {
            info!("No Bluetooth printer selected");
            Ok(Discovery::Cancelled)
        }
    }
}

/// Identity of one configured Bluetooth printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BleTarget {
    pub name: String,
    pub device_id: String,
    pub service: Uuid,
    pub characteristic: Uuid,
}

impl BleTarget {
    pub fn new(name: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_id: device_id.into(),
            service: DEFAULT_SERVICE_UUID,
            characteristic: DEFAULT_CHARACTERISTIC_UUID,
        }
    }

    pub fn with_uuids(mut self, service: Uuid, characteristic: Uuid) -> Self {
        self.service = service;
        self.characteristic = characteristic;
        self
    }

    /// Alias under which the connection is cached
    pub fn key(&self) -> String {
        format!("bluetooth:{}", self.name)
    }

    fn validate(&self) -> PrintResult<()> {
        if self.name.trim().is_empty() || self.device_id.trim().is_empty() {
            return Err(PrintError::InvalidConfig(
                "Printer name and bluetoothId are required for Bluetooth printing".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bluetooth printer bound to one target
#[derive(Clone)]
pub struct BluetoothPrinter {
    backend: Arc<dyn BleBackend>,
    connections: ConnectionRegistry<Arc<dyn BleDevice>>,
    target: BleTarget,
    plan: ChunkPlan,
    scan_timeout: Duration,
}

impl BluetoothPrinter {
    pub fn new(
        backend: Arc<dyn BleBackend>,
        connections: ConnectionRegistry<Arc<dyn BleDevice>>,
        target: BleTarget,
    ) -> Self {
        Self {
            backend,
            connections,
            target,
            plan: ChunkPlan::BLUETOOTH,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }

    pub fn with_plan(mut self, plan: ChunkPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    pub fn target(&self) -> &BleTarget {
        &self.target
    }

    /// Cached handle, reconnected handle, or a freshly discovered device
    #[instrument(skip(self), fields(printer = %self.target.name))]
    pub async fn connect(&self) -> PrintResult<Arc<dyn BleDevice>> {
        self.target.validate()?;

        if let Some(device) = self.connections.get(&self.target.device_id).await {
            if device.is_connected().await {
                return Ok(device);
            }
            match device.connect().await {
                Ok(()) => {
                    info!(id = device.id(), "Reconnected cached device");
                    return Ok(device);
                }
                Err(e) => {
                    warn!(id = device.id(), error = %e, "Reconnect failed, discovering again");
                    self.connections.invalidate(&self.target.device_id).await;
                }
            }
        }

        let filter = DeviceFilter::for_target(&self.target);
        let found = match discover_one(self.backend.as_ref(), &filter, self.scan_timeout).await? {
            Discovery::Found(found) => found,
            Discovery::Cancelled => return Err(PrintError::Cancelled),
        };

        let device = self.backend.device(&found.id).await?;
        device.connect().await?;
        info!(id = %found.id, "Connected to GATT server");

        let key = self.target.key();
        self.connections
            .insert(&found.id, device.clone(), Some(key.as_str()))
            .await;
        if found.id != self.target.device_id {
            self.connections
                .insert(&found.id, device.clone(), Some(self.target.device_id.as_str()))
                .await;
        }
        Ok(device)
    }

    /// Write the payload in chunks, one at a time
    #[instrument(skip(self, data), fields(printer = %self.target.name, data_len = data.len()))]
    pub async fn send(&self, data: &[u8]) -> PrintResult<usize> {
        let device = self.connect().await?;
        let (service, characteristic) = (self.target.service, self.target.characteristic);
        let handle: &dyn BleDevice = device.as_ref();

        let result = write_chunked(data, self.plan, move |chunk| {
            handle.write(service, characteristic, chunk)
        })
        .await;

        match result {
            Ok(chunks) => {
                info!(chunks, "Data sent to Bluetooth printer");
                Ok(chunks)
            }
            Err(e) => {
                // Next job starts from a fresh connection
                self.connections.invalidate(device.id()).await;
                Err(e)
            }
        }
    }
}

impl Printer for BluetoothPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        self.send(data).await.map(|_| ())
    }

    async fn is_online(&self) -> bool {
        self.connect().await.is_ok()
    }
}
