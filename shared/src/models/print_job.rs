//! Print job and print outcome models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::printer::PrinterConfig;

/// Lifecycle of one transfer attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Printing,
    Completed,
    Failed,
}

/// Record of one print attempt (process-local, never persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: String,
    pub content: String,
    pub printer: PrinterConfig,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PrintJob {
    pub fn new(content: &str, printer: &PrinterConfig) -> Self {
        Self {
            id: crate::util::new_id(),
            content: content.to_string(),
            printer: printer.clone(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Printing;
    }

    pub fn complete(&mut self) {
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error = Some(error.into());
    }
}

/// Why a print attempt did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No printer for the location, or a required field is absent
    ConfigurationMissing,
    /// The host lacks the Bluetooth/USB stack the transport needs
    PlatformUnsupported,
    /// The operator dismissed a device chooser; not an error
    UserCancelled,
    ConnectionFailed,
    TransferFailed,
    /// Programming error (unknown transport, panic inside an adapter)
    Internal,
}

/// Uniform result of a print request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<PrintJob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl PrintOutcome {
    pub fn printed(message: impl Into<String>, job: PrintJob) -> Self {
        Self {
            success: true,
            message: message.into(),
            job: Some(job),
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            job: None,
            failure: Some(kind),
        }
    }

    pub fn with_job(mut self, job: PrintJob) -> Self {
        self.job = Some(job);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.failure == Some(FailureKind::UserCancelled)
    }
}
