//! Multipart field names and allow-listed content types.

/// Multipart field carrying the chunk (or whole-file) bytes.
pub const FIELD_FILE: &str = "file";
/// Zero-based chunk index.
pub const FIELD_CHUNK_INDEX: &str = "chunkIndex";
/// Total number of chunks for the file.
pub const FIELD_TOTAL_CHUNKS: &str = "totalChunks";
/// Original file name of the source file.
pub const FIELD_FILE_NAME: &str = "fileName";
/// Report-type key of the slot the file was assigned to.
pub const FIELD_FILE_TYPE: &str = "fileType";
/// Report date, `YYYY-MM-DD`.
pub const FIELD_DATE: &str = "date";

/// Format used for the `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const MIME_CSV: &str = "text/csv";
pub const MIME_LEGACY_EXCEL: &str = "application/vnd.ms-excel";
pub const MIME_MODERN_EXCEL: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Declared content types accepted for report files.
pub const ALLOWED_MIME_TYPES: [&str; 3] = [MIME_CSV, MIME_LEGACY_EXCEL, MIME_MODERN_EXCEL];

/// File extensions accepted for report files (compared lowercase).
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "xls", "xlsx"];
