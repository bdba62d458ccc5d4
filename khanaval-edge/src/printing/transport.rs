//! Transport dispatch
//!
//! Each transport turns plain receipt text into the printer payload
//! (`format_for_printer` + charset encoding) and hands it to the matching
//! adapter from `khanaval-printer`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use khanaval_printer::{
    BleBackend, BleDevice, BleTarget, BluetoothPrinter, Charset, ChunkPlan, ConnectionRegistry,
    DeviceFilter, Discovery, HttpPrinter, PaperWidth, PrintError, PrintResult, Printer,
    UsbBackend, UsbPrinter, discover_one, encode_payload, format_for_printer,
};
use shared::models::{self, ConnectionType, PrinterCharset, PrinterConfig};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::core::Config;

/// One way of reaching a printer
#[async_trait]
pub trait PrintTransport: Send + Sync {
    fn connection_type(&self) -> ConnectionType;

    /// Format, encode and deliver `content`
    async fn send(&self, content: &str, printer: &PrinterConfig) -> PrintResult<()>;

    /// Best-effort reachability check; never fails
    async fn probe(&self, printer: &PrinterConfig) -> bool;

    /// Drop cached connection state for `printer` (config edited or deleted)
    async fn forget(&self, _printer: &PrinterConfig) {}

    /// Look for a nearby device that could be added as a printer
    async fn scan(&self) -> PrintResult<Discovery> {
        Err(PrintError::Unsupported(format!(
            "{} printers cannot be scanned for",
            self.connection_type()
        )))
    }
}

fn paper_width(width: models::PaperWidth) -> PaperWidth {
    match width {
        models::PaperWidth::Mm58 => PaperWidth::Mm58,
        models::PaperWidth::Mm80 => PaperWidth::Mm80,
    }
}

fn charset(charset: PrinterCharset) -> Charset {
    match charset {
        PrinterCharset::Utf8 => Charset::Utf8,
        PrinterCharset::Latin1 => Charset::Latin1,
    }
}

/// Bytes sent to `printer` for `content`
pub fn render_payload(content: &str, printer: &PrinterConfig) -> Vec<u8> {
    let text = format_for_printer(content, paper_width(printer.paper_width));
    encode_payload(&text, charset(printer.charset))
}

// ========== Bluetooth ==========

pub struct BluetoothTransport {
    backend: Arc<dyn BleBackend>,
    connections: ConnectionRegistry<Arc<dyn BleDevice>>,
    plan: ChunkPlan,
    scan_timeout: Duration,
}

impl BluetoothTransport {
    pub fn new(backend: Arc<dyn BleBackend>) -> Self {
        Self {
            backend,
            connections: ConnectionRegistry::new(),
            plan: ChunkPlan::BLUETOOTH,
            scan_timeout: khanaval_printer::bluetooth::DEFAULT_SCAN_TIMEOUT,
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

    pub fn connections(&self) -> &ConnectionRegistry<Arc<dyn BleDevice>> {
        &self.connections
    }

    fn target(printer: &PrinterConfig) -> PrintResult<BleTarget> {
        let device_id = printer.bluetooth_id.as_deref().unwrap_or_default();
        let parse = |value: &str, what: &str| {
            Uuid::parse_str(value.trim()).map_err(|e| {
                PrintError::InvalidConfig(format!("Invalid GATT {what} UUID {value}: {e}"))
            })
        };
        let service = parse(printer.ble_service_uuid(), "service")?;
        let characteristic = parse(printer.ble_characteristic_uuid(), "characteristic")?;
        Ok(BleTarget::new(&printer.name, device_id).with_uuids(service, characteristic))
    }

    fn printer(&self, printer: &PrinterConfig) -> PrintResult<BluetoothPrinter> {
        Ok(BluetoothPrinter::new(
            self.backend.clone(),
            self.connections.clone(),
            Self::target(printer)?,
        )
        .with_plan(self.plan)
        .with_scan_timeout(self.scan_timeout))
    }
}

#[async_trait]
impl PrintTransport for BluetoothTransport {
    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Bluetooth
    }

    #[instrument(skip(self, content, printer), fields(printer = %printer.name))]
    async fn send(&self, content: &str, printer: &PrinterConfig) -> PrintResult<()> {
        let payload = render_payload(content, printer);
        self.printer(printer)?.print(&payload).await
    }

    async fn probe(&self, printer: &PrinterConfig) -> bool {
        match self.printer(printer) {
            Ok(adapter) => adapter.is_online().await,
            Err(_) => false,
        }
    }

    async fn forget(&self, printer: &PrinterConfig) {
        let alias = printer.key().to_string();
        let mut dropped = self.connections.invalidate(&alias).await;
        if let Some(id) = printer.bluetooth_id.as_deref() {
            dropped |= self.connections.invalidate(id).await;
        }
        debug!(printer = %printer.name, dropped, "Bluetooth connection forgotten");
    }

    async fn scan(&self) -> PrintResult<Discovery> {
        discover_one(
            self.backend.as_ref(),
            &DeviceFilter::printers(),
            self.scan_timeout,
        )
        .await
    }
}

// ========== Network ==========

pub struct NetworkTransport {
    client: reqwest::Client,
    probe_timeout: Duration,
}

impl NetworkTransport {
    pub fn new(probe_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            probe_timeout,
        }
    }

    /// Share a preconfigured client (proxy, pool settings)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn printer(&self, printer: &PrinterConfig) -> PrintResult<HttpPrinter> {
        let ip = printer.ip_address.as_deref().unwrap_or_default();
        Ok(HttpPrinter::new(ip)?
            .with_client(self.client.clone())
            .with_probe_timeout(self.probe_timeout))
    }
}

#[async_trait]
impl PrintTransport for NetworkTransport {
    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Network
    }

    #[instrument(skip(self, content, printer), fields(printer = %printer.name))]
    async fn send(&self, content: &str, printer: &PrinterConfig) -> PrintResult<()> {
        let adapter = self.printer(printer)?;
        adapter.print(&render_payload(content, printer)).await
    }

    async fn probe(&self, printer: &PrinterConfig) -> bool {
        match self.printer(printer) {
            Ok(adapter) => adapter.is_online().await,
            Err(_) => false,
        }
    }
}

// ========== USB ==========

pub struct UsbTransport {
    printer: UsbPrinter,
}

impl UsbTransport {
    pub fn new(backend: Arc<dyn UsbBackend>) -> Self {
        Self {
            printer: UsbPrinter::new(backend),
        }
    }

    pub fn with_plan(mut self, plan: ChunkPlan) -> Self {
        self.printer = self.printer.with_plan(plan);
        self
    }
}

#[async_trait]
impl PrintTransport for UsbTransport {
    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Usb
    }

    #[instrument(skip(self, content, printer), fields(printer = %printer.name))]
    async fn send(&self, content: &str, printer: &PrinterConfig) -> PrintResult<()> {
        self.printer.print(&render_payload(content, printer)).await
    }

    async fn probe(&self, _printer: &PrinterConfig) -> bool {
        self.printer.probe().await
    }
}

// ========== Routing ==========

/// One transport per connection type
#[derive(Clone)]
pub struct TransportSet {
    bluetooth: Arc<dyn PrintTransport>,
    network: Arc<dyn PrintTransport>,
    usb: Arc<dyn PrintTransport>,
}

impl TransportSet {
    pub fn new(
        bluetooth: Arc<dyn PrintTransport>,
        network: Arc<dyn PrintTransport>,
        usb: Arc<dyn PrintTransport>,
    ) -> Self {
        Self {
            bluetooth,
            network,
            usb,
        }
    }

    /// Transports over the host's Bluetooth and USB stacks
    ///
    /// A stack that is compiled out or missing on this host yields a
    /// transport that reports it as unsupported.
    pub async fn from_config(config: &Config) -> Self {
        let bluetooth = BluetoothTransport::new(ble_backend().await)
            .with_plan(config.ble_plan())
            .with_scan_timeout(config.scan_timeout());
        let network = NetworkTransport::new(config.probe_timeout());
        let usb = UsbTransport::new(usb_backend()).with_plan(config.usb_plan());

        Self::new(Arc::new(bluetooth), Arc::new(network), Arc::new(usb))
    }

    pub fn route(&self, connection_type: ConnectionType) -> &dyn PrintTransport {
        match connection_type {
            ConnectionType::Bluetooth => self.bluetooth.as_ref(),
            ConnectionType::Network => self.network.as_ref(),
            ConnectionType::Usb => self.usb.as_ref(),
        }
    }
}

#[cfg(feature = "ble")]
async fn ble_backend() -> Arc<dyn BleBackend> {
    match khanaval_printer::BtleplugBackend::new().await {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            tracing::warn!(error = %e, "Bluetooth unavailable");
            Arc::new(khanaval_printer::UnavailableBle)
        }
    }
}

#[cfg(not(feature = "ble"))]
async fn ble_backend() -> Arc<dyn BleBackend> {
    Arc::new(khanaval_printer::UnavailableBle)
}

fn usb_backend() -> Arc<dyn UsbBackend> {
    #[cfg(feature = "usb")]
    {
        Arc::new(khanaval_printer::NusbBackend)
    }
    #[cfg(not(feature = "usb"))]
    {
        Arc::new(khanaval_printer::UnavailableUsb)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Records every call; `send` answers with the scripted failure if any
    pub struct RecordingTransport {
        pub kind: ConnectionType,
        pub sent: Mutex<Vec<(String, String)>>,
        pub probes: AtomicUsize,
        pub forgotten: Mutex<Vec<String>>,
        pub fail_with: Mutex<Option<fn() -> PrintError>>,
        pub online: AtomicBool,
        pub panic_on_send: AtomicBool,
    }

    impl RecordingTransport {
        pub fn new(kind: ConnectionType) -> Arc<Self> {
            Arc::new(Self {
                kind,
                sent: Mutex::new(Vec::new()),
                probes: AtomicUsize::new(0),
                forgotten: Mutex::new(Vec::new()),
                fail_with: Mutex::new(None),
                online: AtomicBool::new(true),
                panic_on_send: AtomicBool::new(false),
            })
        }

        pub fn fail_with(&self, error: fn() -> PrintError) {
            *self.fail_with.lock() = Some(error);
        }

        pub fn calls(&self) -> usize {
            self.sent.lock().len() + self.probes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PrintTransport for RecordingTransport {
        fn connection_type(&self) -> ConnectionType {
            self.kind
        }

        async fn send(&self, content: &str, printer: &PrinterConfig) -> PrintResult<()> {
            if self.panic_on_send.load(Ordering::SeqCst) {
                panic!("transport exploded");
            }
            self.sent
                .lock()
                .push((printer.name.clone(), content.to_string()));
            let scripted = *self.fail_with.lock();
            match scripted {
                Some(error) => Err(error()),
                None => Ok(()),
            }
        }

        async fn probe(&self, _printer: &PrinterConfig) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.online.load(Ordering::SeqCst)
        }

        async fn forget(&self, printer: &PrinterConfig) {
            self.forgotten.lock().push(printer.name.clone());
        }
    }

    /// Bluetooth, network and USB recording transports
    pub fn transports() -> (
        TransportSet,
        Arc<RecordingTransport>,
        Arc<RecordingTransport>,
        Arc<RecordingTransport>,
    ) {
        let bt = RecordingTransport::new(ConnectionType::Bluetooth);
        let net = RecordingTransport::new(ConnectionType::Network);
        let usb = RecordingTransport::new(ConnectionType::Usb);
        let set = TransportSet::new(bt.clone(), net.clone(), usb.clone());
        (set, bt, net, usb)
    }
}
