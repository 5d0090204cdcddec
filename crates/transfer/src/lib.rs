//! Report file handles, allow-list validation and fixed-size chunk splitting.
//!
//! Chunk plans only describe byte ranges. [`ChunkReader`] reads each range
//! when it is reached, so a disk file is never held in memory whole.

mod chunked;
mod file;
mod progress;
mod types;
mod validation;

pub use chunked::{ChunkPlan, ChunkReader, split};
pub use file::FileHandle;
pub use progress::chunk_progress;
pub use types::{Chunk, ChunkSpan};
pub use validation::is_allowed;

/// Default chunk size: 5 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("not a regular file: {0}")]
    NotAFile(String),

    #[error("range {start}..{end} is outside a {size}-byte file")]
    OutOfRange { start: u64, end: u64, size: u64 },
}
