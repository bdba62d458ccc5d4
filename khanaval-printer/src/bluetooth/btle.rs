//! btleplug-backed Bluetooth central

use super::{BleBackend, BleDevice, DeviceInfo};
use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// First Bluetooth adapter of the host
#[derive(Clone)]
pub struct BtleplugBackend {
    adapter: Adapter,
}

impl BtleplugBackend {
    /// Open the first adapter; a host without one is unsupported
    pub async fn new() -> PrintResult<Self> {
        let manager = Manager::new()
            .await
            .map_err(|e| PrintError::Unsupported(format!("Bluetooth manager: {e}")))?;
        let adapter = manager
            .adapters()
            .await
            .map_err(|e| PrintError::Unsupported(format!("Bluetooth adapters: {e}")))?
            .into_iter()
            .next()
            .ok_or_else(|| PrintError::Unsupported("No Bluetooth adapter found".to_string()))?;
        Ok(Self { adapter })
    }

    async fn find(&self, device_id: &str) -> PrintResult<Option<Peripheral>> {
        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| PrintError::Connection(e.to_string()))?;
        Ok(peripherals
            .into_iter()
            .find(|p| p.address().to_string() == device_id))
    }
}

#[async_trait]
impl BleBackend for BtleplugBackend {
    async fn scan(&self, timeout: Duration) -> PrintResult<Vec<DeviceInfo>> {
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| PrintError::Connection(format!("Scan failed: {e}")))?;
        tokio::time::sleep(timeout).await;

        let peripherals = self.adapter.peripherals().await;
        if let Err(e) = self.adapter.stop_scan().await {
            warn!(error = %e, "Failed to stop Bluetooth scan");
        }
        let peripherals = peripherals.map_err(|e| PrintError::Connection(e.to_string()))?;

        let mut found = Vec::with_capacity(peripherals.len());
        for peripheral in peripherals {
            let props = match peripheral.properties().await {
                Ok(Some(props)) => props,
                Ok(None) => continue,
                Err(e) => {
                    debug!(error = %e, "Skipping peripheral without properties");
                    continue;
                }
            };
            found.push(DeviceInfo {
                id: props.address.to_string(),
                name: props.local_name,
                services: props.services,
                rssi: props.rssi,
            });
        }
        debug!(count = found.len(), "Bluetooth scan finished");
        Ok(found)
    }

    async fn device(&self, device_id: &str) -> PrintResult<Arc<dyn BleDevice>> {
        let peripheral = self
            .find(device_id)
            .await?
            .ok_or_else(|| PrintError::Connection(format!("Bluetooth device {device_id} not found")))?;
        Ok(Arc::new(BtleplugDevice {
            id: device_id.to_string(),
            peripheral,
        }))
    }
}

struct BtleplugDevice {
    id: String,
    peripheral: Peripheral,
}

#[async_trait]
impl BleDevice for BtleplugDevice {
    fn id(&self) -> &str {
        &self.id
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn connect(&self) -> PrintResult<()> {
        if !self.is_connected().await {
            self.peripheral
                .connect()
                .await
                .map_err(|e| PrintError::Connection(format!("GATT connect failed: {e}")))?;
        }
        self.peripheral
            .discover_services()
            .await
            .map_err(|e| PrintError::Connection(format!("Service discovery failed: {e}")))
    }

    async fn write(&self, service: Uuid, characteristic: Uuid, data: &[u8]) -> PrintResult<()> {
        let target = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == characteristic && c.service_uuid == service)
            .ok_or_else(|| {
                PrintError::Connection(format!(
                    "Characteristic {characteristic} not found in service {service}"
                ))
            })?;

        self.peripheral
            .write(&target, data, WriteType::WithResponse)
            .await
            .map_err(|e| PrintError::Write(e.to_string()))
    }
}
