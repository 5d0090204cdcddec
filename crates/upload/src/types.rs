//! Data types for the upload flow.

use chrono::NaiveDate;
use reportdrop_protocol::SlotStatus;
use serde::Serialize;

/// Metadata shared by every file of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchMetadata {
    /// Report date; required before anything is sent.
    pub report_date: Option<NaiveDate>,
}

impl BatchMetadata {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            report_date: Some(date),
        }
    }
}

/// How a file is handed to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadMode {
    /// Fixed-size chunks, one request each.
    #[default]
    Chunked,
    /// The whole file in a single request.
    WholeFile,
}

/// Progress event emitted while uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// A slot started uploading.
    Started { key: String, total_chunks: usize },
    /// A chunk was accepted by the transport.
    Progress {
        key: String,
        chunk_index: usize,
        total_chunks: usize,
        progress: u8,
    },
    /// Every chunk of the slot's file was sent.
    Completed { key: String },
    /// The slot's upload failed.
    Failed { key: String, error: String },
    /// The slot's upload was cancelled at a chunk boundary.
    Aborted { key: String },
}

/// Read-only view of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSnapshot {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    pub status: SlotStatus,
    pub progress: u8,
    /// Whether a live cancellation handle exists (busy indicator).
    pub loading: bool,
}

/// A slot whose file was uploaded in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedSlot {
    pub key: String,
    pub label: String,
}

/// A slot whose upload failed in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSlot {
    pub key: String,
    pub label: String,
    /// User-facing error message.
    pub error: String,
    /// The failure was a cancellation rather than a transport error.
    pub aborted: bool,
}

/// Overall result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Success,
    PartialFailure,
    TotalFailure,
}

/// Per-slot results of one submission, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<UploadedSlot>,
    pub failed: Vec<FailedSlot>,
}

impl BatchReport {
    pub fn outcome(&self) -> BatchOutcome {
        match (self.succeeded.is_empty(), self.failed.is_empty()) {
            (_, true) => BatchOutcome::Success,
            (false, false) => BatchOutcome::PartialFailure,
            (true, false) => BatchOutcome::TotalFailure,
        }
    }

    /// Labels of failed slots, in submission order.
    pub fn failed_labels(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.label.as_str()).collect()
    }
}
