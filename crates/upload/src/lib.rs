//! Report upload core.
//!
//! This crate holds the **business logic** of the uploader: which file
//! sits in which report slot, how one file is sent chunk by chunk, and how
//! a batch of slots is submitted and summarised. It has no UI or network
//! code; the application supplies a [`ChunkTransport`] and a
//! [`NotificationSink`](reportdrop_notify::NotificationSink).
//!
//! # Flow
//!
//! 1. **Assign** — files are validated and placed in slots ([`FileRegistry`])
//! 2. **Submit** — [`BatchCoordinator`] checks preconditions, then walks the
//!    selected slots one at a time
//! 3. **Upload** — [`UploadOrchestrator`] sends one file's chunks in order,
//!    checking cancellation between chunks
//! 4. **Report** — the [`BatchReport`] is mapped to notifications

pub mod batch;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use batch::BatchCoordinator;
pub use error::{UploadError, ValidationError};
pub use orchestrator::UploadOrchestrator;
pub use registry::{FileRegistry, UploadTicket};
pub use report::{assign_and_notify, notify_batch, notify_error, submit_and_notify};
pub use transport::{ChunkRequest, ChunkTransport, TransportError, TransportFuture, TransportResponse};
pub use types::{
    BatchMetadata, BatchOutcome, BatchReport, FailedSlot, SlotSnapshot, UploadEvent, UploadMode,
    UploadedSlot,
};
