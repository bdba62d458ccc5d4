//! nusb-backed USB host

use super::{
    ConfigurationDescriptor, Direction, EndpointDescriptor, InterfaceDescriptor, TransferType,
    UsbBackend, UsbDevice, UsbDeviceInfo,
};
use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use nusb::transfer::{Direction as NusbDirection, EndpointType};
use tokio::sync::Mutex;
use tracing::debug;

/// Devices visible to this process through nusb
#[derive(Debug, Clone, Copy, Default)]
pub struct NusbBackend;

fn device_id(info: &nusb::DeviceInfo) -> String {
    format!("{}:{}", info.bus_number(), info.device_address())
}

fn describe(info: &nusb::DeviceInfo) -> UsbDeviceInfo {
    UsbDeviceInfo {
        id: device_id(info),
        vendor_id: info.vendor_id(),
        product_id: info.product_id(),
        product: info.product_string().map(str::to_string),
        class: info.class(),
        interface_classes: info.interfaces().map(|i| i.class()).collect(),
    }
}

fn list_devices() -> PrintResult<impl Iterator<Item = nusb::DeviceInfo>> {
    nusb::list_devices()
        .map_err(|e| PrintError::Unsupported(format!("USB enumeration failed: {e}")))
}

#[async_trait]
impl UsbBackend for NusbBackend {
    async fn list(&self) -> PrintResult<Vec<UsbDeviceInfo>> {
        let devices: Vec<UsbDeviceInfo> = list_devices()?.map(|d| describe(&d)).collect();
        debug!(count = devices.len(), "USB devices enumerated");
        Ok(devices)
    }

    async fn open(&self, device: &UsbDeviceInfo) -> PrintResult<Box<dyn UsbDevice>> {
        let info = list_devices()?
            .find(|d| device_id(d) == device.id)
            .ok_or_else(|| PrintError::Connection(format!("USB device {} disconnected", device.id)))?;
        let handle = info
            .open()
            .map_err(|e| PrintError::Connection(format!("Failed to open {}: {e}", device.label())))?;
        Ok(Box::new(NusbDevice {
            device: handle,
            interface: Mutex::new(None),
        }))
    }
}

struct NusbDevice {
    device: nusb::Device,
    interface: Mutex<Option<nusb::Interface>>,
}

#[async_trait]
impl UsbDevice for NusbDevice {
    fn active_configuration(&self) -> Option<ConfigurationDescriptor> {
        let config = self.device.active_configuration().ok()?;
        let interfaces = config
            .interface_alt_settings()
            .map(|alt| InterfaceDescriptor {
                number: alt.interface_number(),
                alt_setting: alt.alternate_setting(),
                class: alt.class(),
                endpoints: alt
                    .endpoints()
                    .map(|ep| EndpointDescriptor {
                        address: ep.address(),
                        direction: match ep.direction() {
                            NusbDirection::In => Direction::In,
                            NusbDirection::Out => Direction::Out,
                        },
                        transfer_type: match ep.transfer_type() {
                            EndpointType::Control => TransferType::Control,
                            EndpointType::Isochronous => TransferType::Isochronous,
                            EndpointType::Bulk => TransferType::Bulk,
                            EndpointType::Interrupt => TransferType::Interrupt,
                        },
                    })
                    .collect(),
            })
            .collect();
        Some(ConfigurationDescriptor {
            value: config.configuration_value(),
            interfaces,
        })
    }

    async fn select_configuration(&self, value: u8) -> PrintResult<()> {
        self.device
            .set_configuration(value)
            .map_err(|e| PrintError::Connection(format!("Failed to select configuration {value}: {e}")))
    }

    async fn claim_interface(&self, number: u8) -> PrintResult<()> {
        let interface = self
            .device
            .claim_interface(number)
            .map_err(|e| PrintError::Connection(format!("Failed to claim interface {number}: {e}")))?;
        *self.interface.lock().await = Some(interface);
        Ok(())
    }

    async fn bulk_out(&self, endpoint: u8, data: &[u8]) -> PrintResult<()> {
        let interface = self
            .interface
            .lock()
            .await
            .clone()
            .ok_or_else(|| PrintError::Write("interface not claimed".to_string()))?;
        interface
            .bulk_out(endpoint, data.to_vec())
            .await
            .into_result()
            .map(|_| ())
            .map_err(|e| PrintError::Write(e.to_string()))
    }

    async fn close(&self) -> PrintResult<()> {
        self.interface.lock().await.take();
        Ok(())
    }
}
