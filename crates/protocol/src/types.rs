use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DATE_FORMAT, FIELD_CHUNK_INDEX, FIELD_DATE, FIELD_FILE_NAME, FIELD_FILE_TYPE,
    FIELD_TOTAL_CHUNKS,
};

/// Upload state of a report slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    #[default]
    Pending,
    Uploading,
    Uploaded,
    Failed,
}

/// A report type the backend accepts, one upload slot each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportType {
    /// Stable key sent as `fileType`.
    pub key: String,
    /// Human-readable name shown to the user.
    pub label: String,
}

impl ReportType {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// The report types known to the backend.
pub fn default_report_types() -> Vec<ReportType> {
    vec![
        ReportType::new("diversedaily", "Diversedaily Time Card Report"),
        ReportType::new("employeeTotal", "Employee Total Hours Report"),
        ReportType::new("horizon", "Horizon GA 48 (EOS)"),
        ReportType::new("labor", "Daily Labor Report"),
    ]
}

/// Text fields sent alongside each chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFields {
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub file_name: String,
    pub file_type: String,
    pub date: NaiveDate,
}

impl ChunkFields {
    /// Returns the `(name, value)` pairs in the order they are appended to the form.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (FIELD_CHUNK_INDEX, self.chunk_index.to_string()),
            (FIELD_TOTAL_CHUNKS, self.total_chunks.to_string()),
            (FIELD_FILE_NAME, self.file_name.clone()),
            (FIELD_FILE_TYPE, self.file_type.clone()),
            (FIELD_DATE, self.date.format(DATE_FORMAT).to_string()),
        ]
    }
}

/// Text fields sent with a whole-file (non-chunked) upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFields {
    pub date: NaiveDate,
}

impl FileFields {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![(FIELD_DATE, self.date.format(DATE_FORMAT).to_string())]
    }
}
