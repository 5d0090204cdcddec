use reportdrop_protocol::constants::{ALLOWED_EXTENSIONS, ALLOWED_MIME_TYPES};

use crate::file::FileHandle;

/// Returns `true` if `file` looks like a CSV or Excel report.
///
/// Either signal is enough: a declared content type from the allow-list,
/// or an allow-listed extension (case-insensitive). Browsers and operating
/// systems often report spreadsheets with an empty or generic type.
pub fn is_allowed(file: &FileHandle) -> bool {
    if ALLOWED_MIME_TYPES.contains(&file.mime_type()) {
        return true;
    }
    file.extension()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}
