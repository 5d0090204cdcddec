//! Wire vocabulary shared by the report uploader and its HTTP backend.
//!
//! The backend receives one multipart form per chunk. Field names, the
//! report-type catalogue and the allow-listed content types live here so
//! the core and the transport agree on them.

pub mod constants;
pub mod types;

pub use types::{ChunkFields, FileFields, ReportType, SlotStatus, default_report_types};
