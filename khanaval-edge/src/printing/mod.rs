//! Printing - printer registry, transport dispatch and the print orchestrator
//!
//! - [`PrinterRegistry`]: printer configurations persisted as a JSON array
//! - [`TransportSet`]: Bluetooth / network / USB transports by connection type
//! - [`PrintService`]: `print_document` and the settings-screen operations
//! - [`Notification`]: operator-facing result messages

pub mod notify;
pub mod registry;
pub mod service;
pub mod transport;

pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier};
pub use registry::{PrinterRegistry, RegistryError, RegistryResult};
pub use service::{PrintService, failure_kind};
pub use transport::{
    BluetoothTransport, NetworkTransport, PrintTransport, TransportSet, UsbTransport,
    render_payload,
};
