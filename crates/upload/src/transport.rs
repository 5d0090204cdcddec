//! Transport trait the application implements for the actual network call.
//!
//! Keeping the transport behind a trait keeps the upload logic decoupled
//! from HTTP and testable with mocks.

use std::future::Future;
use std::pin::Pin;

use reportdrop_protocol::{ChunkFields, FileFields};
use reportdrop_transfer::FileHandle;
use tokio_util::sync::CancellationToken;

/// Opaque failure cause reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }
}

/// Opaque success response. The core only logs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Future returned by transport calls.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

/// One chunk request: raw bytes plus the form fields that describe them.
#[derive(Debug, Clone, Copy)]
pub struct ChunkRequest<'a> {
    pub data: &'a [u8],
    pub fields: &'a ChunkFields,
}

/// Performs the network call for a chunk or a whole file.
///
/// `cancel` is passed along so a transport may stop early; the core itself
/// never interrupts a call in flight and only checks the token between
/// chunks.
pub trait ChunkTransport: Send + Sync {
    /// Sends one chunk and waits for the response.
    fn send_chunk<'a>(
        &'a self,
        request: ChunkRequest<'a>,
        cancel: &'a CancellationToken,
    ) -> TransportFuture<'a>;

    /// Sends a whole file in one request.
    fn send_file<'a>(
        &'a self,
        file: &'a FileHandle,
        fields: &'a FileFields,
        cancel: &'a CancellationToken,
    ) -> TransportFuture<'a>;
}
