//! USB printer-class adapter
//!
//! The device is opened for each job: pick the first printer-class device,
//! select configuration 1 if the device is unconfigured, claim interface 0,
//! then stream the payload to the first bulk OUT endpoint in small chunks.

#[cfg(feature = "usb")]
mod host;

#[cfg(feature = "usb")]
pub use host::NusbBackend;

use crate::chunk::{ChunkPlan, write_chunked};
use crate::error::{PrintError, PrintResult};
use crate::printer::Printer;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// USB printer device class
pub const PRINTER_CLASS: u8 = 0x07;
/// Conventional printer interface
pub const PRINTER_INTERFACE: u8 = 0;
/// Configuration selected on unconfigured devices
pub const DEFAULT_CONFIGURATION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDeviceInfo {
    /// Host-local id (`bus:address`)
    pub id: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub product: Option<String>,
    pub class: u8,
    pub interface_classes: Vec<u8>,
}

impl UsbDeviceInfo {
    pub fn is_printer(&self) -> bool {
        self.class == PRINTER_CLASS || self.interface_classes.contains(&PRINTER_CLASS)
    }

    pub fn label(&self) -> String {
        match &self.product {
            Some(product) => product.clone(),
            None => format!("{:04x}:{:04x}", self.vendor_id, self.product_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Control,
    Isochronous,
    Bulk,
    Interrupt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub address: u8,
    pub direction: Direction,
    pub transfer_type: TransferType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub number: u8,
    pub alt_setting: u8,
    pub class: u8,
    pub endpoints: Vec<EndpointDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationDescriptor {
    pub value: u8,
    pub interfaces: Vec<InterfaceDescriptor>,
}

impl ConfigurationDescriptor {
    /// First bulk OUT endpoint in descriptor order
    pub fn first_bulk_out(&self) -> Option<u8> {
        self.interfaces
            .iter()
            .flat_map(|iface| iface.endpoints.iter())
            .find(|ep| ep.direction == Direction::Out && ep.transfer_type == TransferType::Bulk)
            .map(|ep| ep.address)
    }
}

/// Host USB stack
#[async_trait]
pub trait UsbBackend: Send + Sync {
    /// Devices the process may open
    async fn list(&self) -> PrintResult<Vec<UsbDeviceInfo>>;

    async fn open(&self, device: &UsbDeviceInfo) -> PrintResult<Box<dyn UsbDevice>>;
}

/// An opened USB device
#[async_trait]
pub trait UsbDevice: Send + Sync {
    /// None while the device is unconfigured
    fn active_configuration(&self) -> Option<ConfigurationDescriptor>;

    async fn select_configuration(&self, value: u8) -> PrintResult<()>;

    async fn claim_interface(&self, number: u8) -> PrintResult<()>;

    async fn bulk_out(&self, endpoint: u8, data: &[u8]) -> PrintResult<()>;

    /// Release claimed interfaces
    async fn close(&self) -> PrintResult<()>;
}

/// Host without USB access
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableUsb;

#[async_trait]
impl UsbBackend for UnavailableUsb {
    async fn list(&self) -> PrintResult<Vec<UsbDeviceInfo>> {
        Err(unsupported())
    }

    async fn open(&self, _device: &UsbDeviceInfo) -> PrintResult<Box<dyn UsbDevice>> {
        Err(unsupported())
    }
}

fn unsupported() -> PrintError {
    PrintError::Unsupported("USB access is not available on this host".to_string())
}

/// USB printer: whichever printer-class device is attached
#[derive(Clone)]
pub struct UsbPrinter {
    backend: Arc<dyn UsbBackend>,
    plan: ChunkPlan,
}

impl UsbPrinter {
    pub fn new(backend: Arc<dyn UsbBackend>) -> Self {
        Self {
            backend,
            plan: ChunkPlan::USB,
        }
    }

    pub fn with_plan(mut self, plan: ChunkPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Printer-class devices currently attached
    pub async fn printers(&self) -> PrintResult<Vec<UsbDeviceInfo>> {
        Ok(self
            .backend
            .list()
            .await?
            .into_iter()
            .filter(UsbDeviceInfo::is_printer)
            .collect())
    }

    /// Open the first printer-class device and claim its printer interface
    #[instrument(skip(self))]
    pub async fn connect(&self) -> PrintResult<(UsbDeviceInfo, Box<dyn UsbDevice>)> {
        let info = self
            .printers()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PrintError::Connection("No USB printer connected".to_string()))?;

        let device = self.backend.open(&info).await?;
        if let Err(e) = Self::prepare(device.as_ref()).await {
            Self::release(&info, device.as_ref()).await;
            return Err(e);
        }

        info!(device = %info.label(), "USB printer opened");
        Ok((info, device))
    }

    async fn prepare(device: &dyn UsbDevice) -> PrintResult<()> {
        if device.active_configuration().is_none() {
            device.select_configuration(DEFAULT_CONFIGURATION).await?;
        }
        device.claim_interface(PRINTER_INTERFACE).await
    }

    async fn release(info: &UsbDeviceInfo, device: &dyn UsbDevice) {
        if let Err(e) = device.close().await {
            warn!(device = %info.label(), error = %e, "Failed to release USB device");
        }
    }

    /// Bulk-write the payload; the device is closed afterwards either way
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub async fn send(&self, data: &[u8]) -> PrintResult<usize> {
        let (info, device) = self.connect().await?;
        let result = Self::transfer(&info, device.as_ref(), data, self.plan).await;
        Self::release(&info, device.as_ref()).await;

        let chunks = result?;
        info!(device = %info.label(), chunks, "Data sent to USB printer");
        Ok(chunks)
    }

    async fn transfer(
        info: &UsbDeviceInfo,
        device: &dyn UsbDevice,
        data: &[u8],
        plan: ChunkPlan,
    ) -> PrintResult<usize> {
        let endpoint = device
            .active_configuration()
            .and_then(|config| config.first_bulk_out())
            .ok_or_else(|| PrintError::NoEndpoint(info.label()))?;

        write_chunked(data, plan, move |chunk| device.bulk_out(endpoint, chunk)).await
    }

    /// True when any printer-class device is attached and accessible
    ///
    /// This says nothing about paper or readiness of a specific printer.
    pub async fn probe(&self) -> bool {
        match self.printers().await {
            Ok(printers) => !printers.is_empty(),
            Err(e) => {
                warn!(error = %e, "USB probe failed");
                false
            }
        }
    }
}

impl Printer for UsbPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        self.send(data).await.map(|_| ())
    }

    async fn is_online(&self) -> bool {
        self.probe().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
        writes: Vec<(u8, Vec<u8>)>,
    }

    struct MockUsb {
        devices: Vec<UsbDeviceInfo>,
        endpoints: Vec<EndpointDescriptor>,
        configured: bool,
        fail_write: bool,
        fail_configure: bool,
        log: Arc<Mutex<Log>>,
    }

    impl MockUsb {
        fn printer() -> Self {
            Self {
                devices: vec![
                    UsbDeviceInfo {
                        id: "1:2".to_string(),
                        vendor_id: 0x046d,
                        product_id: 0xc52b,
                        product: Some("Receiver".to_string()),
                        class: 0,
                        interface_classes: vec![3],
                    },
                    UsbDeviceInfo {
                        id: "1:5".to_string(),
                        vendor_id: 0x0416,
                        product_id: 0x5011,
                        product: Some("POS80".to_string()),
                        class: 0,
                        interface_classes: vec![PRINTER_CLASS],
                    },
                ],
                endpoints: vec![
                    EndpointDescriptor {
                        address: 0x81,
                        direction: Direction::In,
                        transfer_type: TransferType::Bulk,
                    },
                    EndpointDescriptor {
                        address: 0x03,
                        direction: Direction::Out,
                        transfer_type: TransferType::Interrupt,
                    },
                    EndpointDescriptor {
                        address: 0x02,
                        direction: Direction::Out,
                        transfer_type: TransferType::Bulk,
                    },
                ],
                configured: false,
                fail_write: false,
                fail_configure: false,
                log: Arc::new(Mutex::new(Log::default())),
            }
        }
    }

    #[async_trait]
    impl UsbBackend for MockUsb {
        async fn list(&self) -> PrintResult<Vec<UsbDeviceInfo>> {
            Ok(self.devices.clone())
        }

        async fn open(&self, device: &UsbDeviceInfo) -> PrintResult<Box<dyn UsbDevice>> {
            self.log.lock().unwrap().calls.push(format!("open {}", device.id));
            Ok(Box::new(MockDevice {
                configured: AtomicBool::new(self.configured),
                endpoints: self.endpoints.clone(),
                fail_write: self.fail_write,
                fail_configure: self.fail_configure,
                log: self.log.clone(),
            }))
        }
    }

    struct MockDevice {
        configured: AtomicBool,
        endpoints: Vec<EndpointDescriptor>,
        fail_write: bool,
        fail_configure: bool,
        log: Arc<Mutex<Log>>,
    }

    #[async_trait]
    impl UsbDevice for MockDevice {
        fn active_configuration(&self) -> Option<ConfigurationDescriptor> {
            self.configured
                .load(Ordering::SeqCst)
                .then(|| ConfigurationDescriptor {
                    value: 1,
                    interfaces: vec![InterfaceDescriptor {
                        number: 0,
                        alt_setting: 0,
                        class: PRINTER_CLASS,
                        endpoints: self.endpoints.clone(),
                    }],
                })
        }

        async fn select_configuration(&self, value: u8) -> PrintResult<()> {
            self.log.lock().unwrap().calls.push(format!("configure {value}"));
            if self.fail_configure {
                return Err(PrintError::Connection("configuration rejected".to_string()));
            }
            self.configured.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn claim_interface(&self, number: u8) -> PrintResult<()> {
            self.log.lock().unwrap().calls.push(format!("claim {number}"));
            Ok(())
        }

        async fn bulk_out(&self, endpoint: u8, data: &[u8]) -> PrintResult<()> {
            if self.fail_write {
                return Err(PrintError::Write("stall".to_string()));
            }
            self.log.lock().unwrap().writes.push((endpoint, data.to_vec()));
            Ok(())
        }

        async fn close(&self) -> PrintResult<()> {
            self.log.lock().unwrap().calls.push("close".to_string());
            Ok(())
        }
    }

    fn printer(backend: MockUsb) -> UsbPrinter {
        UsbPrinter::new(Arc::new(backend)).with_plan(ChunkPlan::new(64, std::time::Duration::ZERO))
    }

    #[test]
    fn test_first_bulk_out_skips_other_endpoints() {
        let config = ConfigurationDescriptor {
            value: 1,
            interfaces: vec![InterfaceDescriptor {
                number: 0,
                alt_setting: 0,
                class: PRINTER_CLASS,
                endpoints: MockUsb::printer().endpoints,
            }],
        };
        assert_eq!(config.first_bulk_out(), Some(0x02));
    }

    #[tokio::test]
    async fn test_send_configures_claims_and_chunks() {
        let backend = MockUsb::printer();
        let log = backend.log.clone();

        let chunks = printer(backend).send(&[0x1Bu8; 150]).await.unwrap();

        assert_eq!(chunks, 3);
        let log = log.lock().unwrap();
        assert_eq!(log.calls, vec!["open 1:5", "configure 1", "claim 0", "close"]);
        assert_eq!(
            log.writes.iter().map(|(ep, d)| (*ep, d.len())).collect::<Vec<_>>(),
            vec![(0x02, 64), (0x02, 64), (0x02, 22)]
        );
    }

    #[tokio::test]
    async fn test_configured_device_is_not_reconfigured() {
        let mut backend = MockUsb::printer();
        backend.configured = true;
        let log = backend.log.clone();

        printer(backend).print(b"hello").await.unwrap();
        assert_eq!(log.lock().unwrap().calls, vec!["open 1:5", "claim 0", "close"]);
    }

    #[tokio::test]
    async fn test_no_bulk_out_endpoint() {
        let mut backend = MockUsb::printer();
        backend.endpoints.retain(|ep| ep.transfer_type != TransferType::Bulk);
        let log = backend.log.clone();

        let err = printer(backend).send(b"x").await.unwrap_err();
        assert!(matches!(err, PrintError::NoEndpoint(ref name) if name == "POS80"));
        assert_eq!(log.lock().unwrap().calls.last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn test_transfer_failure_still_closes() {
        let mut backend = MockUsb::printer();
        backend.fail_write = true;
        let log = backend.log.clone();

        let err = printer(backend).send(b"x").await.unwrap_err();
        assert!(matches!(err, PrintError::Write(_)));
        assert_eq!(log.lock().unwrap().calls.last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn test_configuration_failure_closes_device() {
        let mut backend = MockUsb::printer();
        backend.fail_configure = true;
        let log = backend.log.clone();

        let err = printer(backend).send(b"x").await.unwrap_err();
        assert!(matches!(err, PrintError::Connection(_)));
        assert_eq!(log.lock().unwrap().calls, vec!["open 1:5", "configure 1", "close"]);
        assert!(log.lock().unwrap().writes.is_empty());
    }

    #[tokio::test]
    async fn test_no_printer_attached() {
        let mut backend = MockUsb::printer();
        backend.devices.retain(|d| !d.is_printer());

        let printer = printer(backend);
        assert!(!printer.probe().await);
        assert!(matches!(
            printer.send(b"x").await,
            Err(PrintError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let printer = UsbPrinter::new(Arc::new(UnavailableUsb));
        assert!(!printer.is_online().await);
        assert!(matches!(printer.send(b"x").await, Err(PrintError::Unsupported(_))));
    }
}
