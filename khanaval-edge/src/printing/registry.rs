//! Printer registry backed by a JSON file
//!
//! The file holds one JSON array of [`PrinterConfig`] (the same shape the
//! browser build stores under `restaurantPrinters`). Every change rewrites
//! the whole array through a temp file + rename. Observed `status` lives in
//! memory only.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared::models::{ConnectionType, PrinterConfig, PrinterKey, PrinterLocation, PrinterStatus};
use thiserror::Error;
use tracing::{debug, info};

use crate::utils::validation::validate_printer;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),

    #[error("Printer not found: {0}")]
    NotFound(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

pub struct PrinterRegistry {
    path: Option<PathBuf>,
    printers: RwLock<Vec<PrinterConfig>>,
}

impl PrinterRegistry {
    /// Load the registry file; a missing file is an empty registry
    pub fn open(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut printers: Vec<PrinterConfig> = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(RegistryError::Io { path, source }),
        };
        // Status is observed, never trusted from disk
        for printer in &mut printers {
            printer.status = PrinterStatus::Offline;
        }
        info!(path = %path.display(), count = printers.len(), "Printer registry loaded");
        Ok(Self {
            path: Some(path),
            printers: RwLock::new(printers),
        })
    }

    /// Registry without a backing file (tests, previews)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            printers: RwLock::new(Vec::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn list(&self) -> Vec<PrinterConfig> {
        self.printers.read().clone()
    }

    pub fn get(&self, name: &str, connection_type: ConnectionType) -> Option<PrinterConfig> {
        self.printers
            .read()
            .iter()
            .find(|p| p.name == name && p.connection_type == connection_type)
            .cloned()
    }

    /// First printer with `name`, whatever its transport
    pub fn find_by_name(&self, name: &str) -> Option<PrinterConfig> {
        self.printers.read().iter().find(|p| p.name == name).cloned()
    }

    /// Insert or replace (matched by name + connection type)
    ///
    /// A default printer clears the flag on every other printer at its
    /// location. Returns the previous entry when one was replaced.
    pub fn upsert(&self, mut config: PrinterConfig) -> RegistryResult<Option<PrinterConfig>> {
        validate_printer(&config).map_err(RegistryError::Invalid)?;
        config.name = config.name.trim().to_string();

        let mut printers = self.printers.write();
        let mut next = printers.clone();
        let key = config.key();

        if config.is_default {
            for other in next
                .iter_mut()
                .filter(|p| p.location == config.location && p.key() != key)
            {
                if other.is_default {
                    debug!(printer = %other.name, "Clearing previous default");
                }
                other.is_default = false;
            }
        }

        let previous = match next.iter().position(|p| p.key() == key) {
            Some(idx) => {
                // Keep the observed status across edits
                config.status = next[idx].status;
                Some(std::mem::replace(&mut next[idx], config))
            }
            None => {
                next.push(config);
                None
            }
        };

        // Memory only changes once the file write succeeded
        self.persist(&next)?;
        *printers = next;
        info!(printer = %key, replaced = previous.is_some(), "Printer saved");
        Ok(previous)
    }

    /// Remove every printer called `name`; returns the removed entries
    pub fn delete(&self, name: &str) -> RegistryResult<Vec<PrinterConfig>> {
        let mut printers = self.printers.write();
        let (removed, kept): (Vec<_>, Vec<_>) =
            printers.iter().cloned().partition(|p| p.name == name);

        if removed.is_empty() {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        self.persist(&kept)?;
        *printers = kept;
        info!(printer = %name, count = removed.len(), "Printer removed");
        Ok(removed)
    }

    /// The enabled default printer for `location`
    pub fn default_for(&self, location: PrinterLocation) -> Option<PrinterConfig> {
        self.printers
            .read()
            .iter()
            .find(|p| p.location == location && p.is_default && p.enabled)
            .cloned()
    }

    /// Enabled printers at `location`
    pub fn printers_for(&self, location: PrinterLocation) -> Vec<PrinterConfig> {
        self.printers
            .read()
            .iter()
            .filter(|p| p.location == location && p.enabled)
            .cloned()
            .collect()
    }

    /// Record an observed status (not persisted)
    pub fn set_status(&self, key: &PrinterKey, status: PrinterStatus) -> bool {
        let mut printers = self.printers.write();
        match printers.iter_mut().find(|p| &p.key() == key) {
            Some(p) => {
                p.status = status;
                true
            }
            None => false,
        }
    }

    /// Stamp a successful print
    pub fn mark_connected(&self, key: &PrinterKey, at: DateTime<Utc>) -> RegistryResult<()> {
        let mut printers = self.printers.write();
        let mut next = printers.clone();
        let printer = next
            .iter_mut()
            .find(|p| &p.key() == key)
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
        printer.last_connected = Some(at);
        printer.status = PrinterStatus::Online;
        self.persist(&next)?;
        *printers = next;
        Ok(())
    }

    fn persist(&self, printers: &[PrinterConfig]) -> RegistryResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(printers)?;

        let io_err = |source| RegistryError::Io {
            path: path.clone(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(io_err)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(e));
        }
        debug!(path = %path.display(), count = printers.len(), "Printer registry written");
        Ok(())
    }
}
