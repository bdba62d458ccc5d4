//! Operator notifications for print and scan results
//!
//! Cancelled device choosers produce no notification at all.

use std::fmt;

use khanaval_printer::{Discovery, PrintResult};
use serde::{Deserialize, Serialize};
use shared::models::PrintOutcome;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Transient message shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Notification for a print attempt; `None` when the operator cancelled
    pub fn for_outcome(outcome: &PrintOutcome) -> Option<Self> {
        if outcome.is_cancelled() {
            return None;
        }
        Some(if outcome.success {
            Self::new(NotificationLevel::Success, "Print Successful", &outcome.message)
        } else {
            Self::new(NotificationLevel::Error, "Print Failed", &outcome.message)
        })
    }

    /// Notification for a Bluetooth scan; `None` when the scan was cancelled
    pub fn for_scan(result: &PrintResult<Discovery>) -> Option<Self> {
        match result {
            Ok(Discovery::Found(device)) => {
                let name = device.name.as_deref().unwrap_or("Unknown printer");
                Some(Self::new(
                    NotificationLevel::Info,
                    "Bluetooth Printer Selected",
                    format!("{name} has been selected. Complete the form to add it."),
                ))
            }
            Ok(Discovery::Cancelled) => None,
            Err(e) if e.is_cancelled() => None,
            Err(e) => Some(Self::new(
                NotificationLevel::Error,
                "Bluetooth Error",
                e.to_string(),
            )),
        }
    }
}

/// Where notifications end up (toast, log, websocket)
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: &Notification) {
        match n.level {
            NotificationLevel::Error => error!(title = %n.title, "{}", n.description),
            NotificationLevel::Warning => warn!(title = %n.title, "{}", n.description),
            NotificationLevel::Info | NotificationLevel::Success => {
                info!(level = %n.level, title = %n.title, "{}", n.description)
            }
        }
    }
}
