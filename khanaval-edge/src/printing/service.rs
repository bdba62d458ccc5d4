//! Print orchestrator
//!
//! Single entry point for every print: resolve the printer for a location,
//! serialize access to the device, dispatch to the matching transport and
//! fold whatever happens into a [`PrintOutcome`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use futures::future::join_all;
use khanaval_printer::{DeviceInfo, Discovery, KeyedLocks, PrintError, PrintResult};
use shared::models::{
    ConnectionType, FailureKind, PrintJob, PrintOutcome, PrinterConfig, PrinterLocation,
    PrinterStatus,
};
use tracing::{debug, error, info, instrument, warn};

use super::notify::{LogNotifier, Notification, Notifier};
use super::registry::{PrinterRegistry, RegistryResult};
use super::transport::TransportSet;
use crate::content::{DocumentOptions, test_page};
use crate::core::config::DEFAULT_RESTAURANT_NAME;

/// Lock key shared by every registry entry that reaches the same device
fn device_key(printer: &PrinterConfig) -> String {
    format!("{}:{}", printer.connection_type, printer.address_label())
}

/// Taxonomy bucket for an adapter error
pub fn failure_kind(error: &PrintError) -> FailureKind {
    match error {
        PrintError::InvalidConfig(_) => FailureKind::ConfigurationMissing,
        PrintError::Unsupported(_) => FailureKind::PlatformUnsupported,
        PrintError::Cancelled => FailureKind::UserCancelled,
        PrintError::Connection(_) | PrintError::Timeout(_) => FailureKind::ConnectionFailed,
        PrintError::HttpStatus(_)
        | PrintError::NoEndpoint(_)
        | PrintError::Write(_)
        | PrintError::Io(_) => FailureKind::TransferFailed,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

pub struct PrintService {
    registry: Arc<PrinterRegistry>,
    transports: TransportSet,
    locks: KeyedLocks,
    notifier: Arc<dyn Notifier>,
    document: DocumentOptions,
}

impl PrintService {
    pub fn new(registry: Arc<PrinterRegistry>, transports: TransportSet) -> Self {
        Self {
            registry,
            transports,
            locks: KeyedLocks::new(),
            notifier: Arc::new(LogNotifier),
            document: DocumentOptions::new(DEFAULT_RESTAURANT_NAME, chrono_tz::Asia::Kolkata),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Restaurant name and timezone used on test pages
    pub fn with_document_options(mut self, document: DocumentOptions) -> Self {
        self.document = document;
        self
    }

    pub fn registry(&self) -> &PrinterRegistry {
        &self.registry
    }

    /// Print `content` on `specific`, or on the default printer for `location`
    ///
    /// Never fails: every path ends in a [`PrintOutcome`]. Without a printer
    /// no transport is touched.
    #[instrument(skip(self, content, specific))]
    pub async fn print_document(
        &self,
        content: &str,
        location: PrinterLocation,
        specific: Option<&PrinterConfig>,
    ) -> PrintOutcome {
        let printer = match specific.cloned() {
            Some(printer) => printer,
            None => match self.registry.default_for(location) {
                Some(printer) => printer,
                None => {
                    warn!("No default printer for location");
                    let outcome = PrintOutcome::failed(
                        FailureKind::ConfigurationMissing,
                        format!("No {location} printer configured. Configure one in Settings"),
                    );
                    self.report(&outcome);
                    return outcome;
                }
            },
        };
        self.print_to(content, printer).await
    }

    /// Send a test page to the registered printer called `name`
    pub async fn test_printer(&self, name: &str) -> PrintOutcome {
        let Some(printer) = self.registry.find_by_name(name) else {
            let outcome = PrintOutcome::failed(
                FailureKind::ConfigurationMissing,
                format!("Printer not found: {name}"),
            );
            self.report(&outcome);
            return outcome;
        };
        let content = test_page(&printer, Utc::now(), &self.document);
        self.print_to(&content, printer).await
    }

    async fn print_to(&self, content: &str, printer: PrinterConfig) -> PrintOutcome {
        let mut job = PrintJob::new(content, &printer);
        let device = device_key(&printer);

        // One job per device at a time
        let _guard = self.locks.lock(&device).await;
        job.start();
        debug!(job_id = %job.id, printer = %printer.name, %device, "Print job started");

        let transport = self.transports.route(printer.connection_type);
        let result = AssertUnwindSafe(transport.send(content, &printer))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(())) => {
                job.complete();
                if let Err(e) = self.registry.mark_connected(&printer.key(), Utc::now()) {
                    debug!(printer = %printer.name, error = %e, "Last-connected not recorded");
                }
                info!(job_id = %job.id, printer = %printer.name, "Print job completed");
                PrintOutcome::printed(format!("Print job sent to {}", printer.name), job)
            }
            Ok(Err(e)) => {
                let kind = failure_kind(&e);
                let message = match kind {
                    FailureKind::UserCancelled => e.to_string(),
                    _ => format!("Failed to print to {}: {e}", printer.name),
                };
                warn!(job_id = %job.id, printer = %printer.name, ?kind, error = %e, "Print job failed");
                job.fail(e.to_string());
                PrintOutcome::failed(kind, message).with_job(job)
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(job_id = %job.id, printer = %printer.name, reason, "Transport panicked");
                job.fail(format!("internal error: {reason}"));
                PrintOutcome::failed(
                    FailureKind::Internal,
                    format!("Internal error while printing to {}", printer.name),
                )
                .with_job(job)
            }
        };

        self.report(&outcome);
        outcome
    }

    /// Probe every enabled printer and record online/offline
    pub async fn refresh_statuses(&self) -> Vec<PrinterConfig> {
        let printers: Vec<PrinterConfig> =
            self.registry.list().into_iter().filter(|p| p.enabled).collect();

        let probes = printers.iter().map(|printer| async move {
            // Probing may reconnect, so it waits for jobs on the same device
            let _guard = self.locks.lock(&device_key(printer)).await;
            let online = self
                .transports
                .route(printer.connection_type)
                .probe(printer)
                .await;
            (printer, online)
        });

        let mut refreshed = Vec::with_capacity(printers.len());
        for (printer, online) in join_all(probes).await {
            let status = if online {
                PrinterStatus::Online
            } else {
                PrinterStatus::Offline
            };
            self.registry.set_status(&printer.key(), status);
            debug!(printer = %printer.name, ?status, "Printer status refreshed");
            refreshed.push(PrinterConfig {
                status,
                ..printer.clone()
            });
        }
        refreshed
    }

    /// Create or update a printer; cached connections of the old entry are dropped
    pub async fn save_printer(&self, config: PrinterConfig) -> RegistryResult<()> {
        if let Some(previous) = self.registry.upsert(config)? {
            self.transports
                .route(previous.connection_type)
                .forget(&previous)
                .await;
        }
        Ok(())
    }

    /// Delete every printer called `name`; returns how many were removed
    pub async fn delete_printer(&self, name: &str) -> RegistryResult<usize> {
        let removed = self.registry.delete(name)?;
        for printer in &removed {
            self.transports
                .route(printer.connection_type)
                .forget(printer)
                .await;
        }
        Ok(removed.len())
    }

    /// Look for one nearby Bluetooth printer
    ///
    /// A scan that ends without a selection is `Ok(None)` and is not
    /// reported to the operator.
    pub async fn scan_bluetooth(&self) -> PrintResult<Option<DeviceInfo>> {
        let result = self.transports.route(ConnectionType::Bluetooth).scan().await;
        if let Some(n) = Notification::for_scan(&result) {
            self.notifier.notify(&n);
        }
        match result {
            Ok(Discovery::Found(device)) => Ok(Some(device)),
            Ok(Discovery::Cancelled) => Ok(None),
            Err(e) if e.is_cancelled() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn report(&self, outcome: &PrintOutcome) {
        if let Some(n) = Notification::for_outcome(outcome) {
            self.notifier.notify(&n);
        }
    }
}
