//! Printer adapter trait
//!
//! Each adapter is bound to one target (an IP address, a Bluetooth device
//! id, the USB printer class) and accepts a fully encoded payload.

use crate::error::PrintResult;

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send a raw ESC/POS payload to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    ///
    /// Never fails; any error counts as offline.
    async fn is_online(&self) -> bool;
}
