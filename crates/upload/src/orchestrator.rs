//! Single-file upload: chunks sent strictly in order, cancellation checked
//! between chunks.

use chrono::NaiveDate;
use reportdrop_protocol::{ChunkFields, FileFields};
use reportdrop_transfer::{ChunkReader, DEFAULT_CHUNK_SIZE, TransferError, chunk_progress};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::registry::{FileRegistry, UploadTicket};
use crate::transport::{ChunkRequest, ChunkTransport};
use crate::types::{UploadEvent, UploadMode};

/// Uploads the file of one slot through a [`ChunkTransport`].
pub struct UploadOrchestrator<'a> {
    transport: &'a dyn ChunkTransport,
    registry: &'a FileRegistry,
    chunk_size: u64,
    events_tx: Option<&'a UnboundedSender<UploadEvent>>,
}

impl<'a> UploadOrchestrator<'a> {
    pub fn new(transport: &'a dyn ChunkTransport, registry: &'a FileRegistry) -> Self {
        Self {
            transport,
            registry,
            chunk_size: DEFAULT_CHUNK_SIZE,
            events_tx: None,
        }
    }

    /// Overrides the 5 MiB chunk size.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Emits [`UploadEvent`]s on `events_tx`.
    pub fn with_events(mut self, events_tx: &'a UnboundedSender<UploadEvent>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    /// Uploads the slot's file in chunks.
    ///
    /// The slot goes `Uploading` on entry, `Uploaded` when the last chunk
    /// is accepted and `Failed` on any error. Nothing is retried.
    pub async fn run(&self, key: &str, date: NaiveDate) -> Result<(), UploadError> {
        self.run_with_mode(key, date, UploadMode::Chunked).await
    }

    /// Uploads the slot's file in a single request.
    pub async fn run_whole_file(&self, key: &str, date: NaiveDate) -> Result<(), UploadError> {
        self.run_with_mode(key, date, UploadMode::WholeFile).await
    }

    pub async fn run_with_mode(
        &self,
        key: &str,
        date: NaiveDate,
        mode: UploadMode,
    ) -> Result<(), UploadError> {
        let ticket = self.registry.begin(key)?;
        let mut guard = AttemptGuard::new(self.registry, &ticket);

        let result = match mode {
            UploadMode::Chunked => self.send_chunks(&ticket, date).await,
            UploadMode::WholeFile => self.send_whole(&ticket, date).await,
        };
        let result = result.and_then(|()| {
            // Cancelled or restarted while the last chunk was in flight.
            if self.registry.complete(&ticket) {
                Ok(())
            } else {
                Err(UploadError::Aborted)
            }
        });

        match &result {
            Ok(()) => {
                info!(slot = %ticket.key, file = %ticket.file.name(), "upload completed");
                self.emit(UploadEvent::Completed {
                    key: ticket.key.clone(),
                });
            }
            Err(UploadError::Aborted) => {
                self.registry.fail(&ticket);
                warn!(slot = %ticket.key, "upload aborted");
                self.emit(UploadEvent::Aborted {
                    key: ticket.key.clone(),
                });
            }
            Err(e) => {
                self.registry.fail(&ticket);
                warn!(slot = %ticket.key, error = %e, "upload failed");
                self.emit(UploadEvent::Failed {
                    key: ticket.key.clone(),
                    error: e.display_message(),
                });
            }
        }
        guard.disarm();
        result
    }

    async fn send_chunks(&self, ticket: &UploadTicket, date: NaiveDate) -> Result<(), UploadError> {
        let mut reader = ChunkReader::new(&ticket.file, self.chunk_size)?;
        let total_chunks = reader.total_chunks();
        self.emit(UploadEvent::Started {
            key: ticket.key.clone(),
            total_chunks,
        });

        loop {
            self.check_cancelled(ticket)?;

            // Disk reads run off the async workers; only one chunk is in memory.
            let (returned, next) = tokio::task::spawn_blocking(move || {
                let next = reader.next_chunk();
                (reader, next)
            })
            .await
            .map_err(|e| TransferError::Io(std::io::Error::other(e)))?;
            reader = returned;
            let Some(chunk) = next? else {
                break;
            };

            let fields = ChunkFields {
                chunk_index: chunk.index(),
                total_chunks,
                file_name: ticket.file.name().to_string(),
                file_type: ticket.key.clone(),
                date,
            };
            debug!(
                slot = %ticket.key,
                chunk = chunk.index(),
                total = total_chunks,
                bytes = chunk.data.len(),
                "sending chunk"
            );

            let request = ChunkRequest {
                data: &chunk.data,
                fields: &fields,
            };
            let response = self
                .transport
                .send_chunk(request, &ticket.cancel)
                .await
                .map_err(|e| self.transport_error(ticket, e.to_string()))?;
            debug!(slot = %ticket.key, chunk = chunk.index(), status = response.status, "chunk accepted");

            let progress = chunk_progress(chunk.index(), total_chunks);
            if self.registry.record_progress(ticket, progress) {
                self.emit(UploadEvent::Progress {
                    key: ticket.key.clone(),
                    chunk_index: chunk.index(),
                    total_chunks,
                    progress,
                });
            }
        }

        Ok(())
    }

    async fn send_whole(&self, ticket: &UploadTicket, date: NaiveDate) -> Result<(), UploadError> {
        self.emit(UploadEvent::Started {
            key: ticket.key.clone(),
            total_chunks: 1,
        });
        self.check_cancelled(ticket)?;

        let fields = FileFields { date };
        debug!(slot = %ticket.key, bytes = ticket.file.size(), "sending whole file");
        self.transport
            .send_file(&ticket.file, &fields, &ticket.cancel)
            .await
            .map_err(|e| self.transport_error(ticket, e.to_string()))?;

        if self.registry.record_progress(ticket, 100) {
            self.emit(UploadEvent::Progress {
                key: ticket.key.clone(),
                chunk_index: 0,
                total_chunks: 1,
                progress: 100,
            });
        }
        Ok(())
    }

    fn check_cancelled(&self, ticket: &UploadTicket) -> Result<(), UploadError> {
        if ticket.cancel.is_cancelled() {
            Err(UploadError::Aborted)
        } else {
            Ok(())
        }
    }

    /// A transport that honoured the token reports an error; show that as a
    /// cancellation.
    fn transport_error(&self, ticket: &UploadTicket, cause: String) -> UploadError {
        if ticket.cancel.is_cancelled() {
            UploadError::Aborted
        } else {
            UploadError::TransportFailed(cause)
        }
    }

    fn emit(&self, event: UploadEvent) {
        if let Some(tx) = self.events_tx {
            let _ = tx.send(event);
        }
    }
}

/// Releases the slot's attempt if the upload future is dropped before it
/// settles, so the busy indicator never sticks.
struct AttemptGuard<'a> {
    registry: &'a FileRegistry,
    key: &'a str,
    attempt: u64,
    armed: bool,
}

impl<'a> AttemptGuard<'a> {
    fn new(registry: &'a FileRegistry, ticket: &'a UploadTicket) -> Self {
        Self {
            registry,
            key: &ticket.key,
            attempt: ticket.attempt,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.registry.release(self.key, self.attempt) {
            warn!(slot = %self.key, "upload abandoned before completion");
        }
    }
}
