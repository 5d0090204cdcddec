//! Upload error types.

use reportdrop_transfer::TransferError;

/// Longest transport cause shown to the user, in characters.
pub const MAX_CAUSE_CHARS: usize = 100;

/// Problems detected before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("file type not allowed: {file_name}")]
    FileTypeNotAllowed { file_name: String },

    #[error("report date is required")]
    MissingReportDate,

    #[error("no files selected")]
    NoFilesSelected,

    #[error("no file assigned to slot {key}")]
    NoFile { key: String },
}

/// Errors produced by the upload core.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("upload aborted by user")]
    Aborted,

    #[error("transport failed: {0}")]
    TransportFailed(String),

    #[error("unknown report slot: {0}")]
    UnknownSlot(String),

    #[error("duplicate report slot: {0}")]
    DuplicateSlot(String),

    #[error("slot is uploading: {0}")]
    SlotBusy(String),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
}

impl UploadError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, UploadError::Aborted)
    }

    /// Dialog title for this error.
    pub fn title(&self) -> &'static str {
        match self {
            UploadError::Validation(ValidationError::FileTypeNotAllowed { .. }) => {
                "Invalid File Type"
            }
            UploadError::Validation(ValidationError::MissingReportDate) => "Date Required",
            UploadError::Validation(ValidationError::NoFilesSelected) => "No Files Selected",
            UploadError::Validation(ValidationError::NoFile { .. }) => "No File Selected",
            UploadError::Aborted => "Canceled",
            UploadError::SlotBusy(_) => "Upload In Progress",
            _ => "Error",
        }
    }

    /// Message shown to the user. Transport causes are truncated to
    /// [`MAX_CAUSE_CHARS`].
    pub fn display_message(&self) -> String {
        match self {
            UploadError::Validation(ValidationError::FileTypeNotAllowed { file_name }) => format!(
                "The file \"{file_name}\" is not a valid Excel or CSV file. \
                 Only CSV (.csv), Excel (.xls, .xlsx) files are allowed."
            ),
            UploadError::Validation(ValidationError::MissingReportDate) => {
                "Please select a report date before uploading.".into()
            }
            UploadError::Validation(ValidationError::NoFilesSelected) => {
                "Please select at least one file to upload.".into()
            }
            UploadError::Aborted => "Upload was canceled by the user.".into(),
            UploadError::TransportFailed(cause) => truncate_cause(cause),
            other => truncate_cause(&other.to_string()),
        }
    }
}

/// Cuts `cause` to at most [`MAX_CAUSE_CHARS`] characters.
pub fn truncate_cause(cause: &str) -> String {
    cause.chars().take(MAX_CAUSE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_cause_is_truncated() {
        let long = "x".repeat(500);
        let err = UploadError::TransportFailed(long);
        assert_eq!(err.display_message().chars().count(), MAX_CAUSE_CHARS);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let cause = "é".repeat(150);
        let cut = truncate_cause(&cause);
        assert_eq!(cut.chars().count(), 100);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    #[test]
    fn short_cause_unchanged() {
        let err = UploadError::TransportFailed("HTTP 502".into());
        assert_eq!(err.display_message(), "HTTP 502");
        assert_eq!(err.title(), "Error");
    }

    #[test]
    fn aborted_reads_as_canceled() {
        let err = UploadError::Aborted;
        assert!(err.is_aborted());
        assert_eq!(err.title(), "Canceled");
        assert_eq!(err.display_message(), "Upload was canceled by the user.");
    }

    #[test]
    fn validation_titles() {
        let date: UploadError = ValidationError::MissingReportDate.into();
        assert_eq!(date.title(), "Date Required");
        let none: UploadError = ValidationError::NoFilesSelected.into();
        assert_eq!(none.title(), "No Files Selected");
        let bad: UploadError = ValidationError::FileTypeNotAllowed {
            file_name: "a.txt".into(),
        }
        .into();
        assert_eq!(bad.title(), "Invalid File Type");
        assert!(bad.display_message().contains("\"a.txt\""));
    }
}
