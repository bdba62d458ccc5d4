//! # khanaval-printer
//!
//! Thermal receipt printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building and the payload formatter
//! - UTF-8 / Latin-1 payload encoding
//! - Chunked, strictly sequential writes
//! - Bluetooth LE printers (GATT write characteristic)
//! - Network printers (HTTP bridge, `POST /print`)
//! - USB printer-class devices (bulk OUT transfer)
//!
//! Business logic (WHAT to print, which printer serves which location)
//! stays in `khanaval-edge`.
//!
//! ## Example
//!
//! ```ignore
//! use khanaval_printer::{encode_payload, format_for_printer, Charset, HttpPrinter, PaperWidth, Printer};
//!
//! let text = format_for_printer("KOT - Table 4\n2 x Paneer Tikka\n", PaperWidth::Mm80);
//! let printer = HttpPrinter::new("192.168.1.50")?;
//! printer.print(&encode_payload(&text, Charset::Utf8)).await?;
//! ```

pub mod bluetooth;
mod chunk;
mod connection;
mod encoding;
mod error;
mod escpos;
mod layout;
mod network;
mod printer;
pub mod usb;

// Re-exports
pub use bluetooth::{
    BleBackend, BleDevice, BleTarget, BluetoothPrinter, DeviceFilter, DeviceInfo, Discovery,
    UnavailableBle, discover_one,
};
pub use chunk::{ChunkPlan, write_chunked};
pub use connection::{ConnectionRegistry, KeyedLocks};
pub use encoding::{Charset, encode_payload, pad_text, text_width, truncate_text};
pub use error::{PrintError, PrintResult};
pub use escpos::{EscPosTextBuilder, PaperWidth, format_for_printer};
pub use layout::ReceiptLayout;
pub use network::HttpPrinter;
pub use printer::Printer;
pub use usb::{UnavailableUsb, UsbBackend, UsbDevice, UsbDeviceInfo, UsbPrinter};

#[cfg(feature = "ble")]
pub use bluetooth::BtleplugBackend;

#[cfg(feature = "usb")]
pub use usb::NusbBackend;
