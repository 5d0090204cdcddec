//! Batch submission: every selected slot, one after another.
//!
//! Preconditions are checked before anything is sent. A failed file does
//! not stop the batch; a `cancel_all` does.

use std::sync::Arc;

use chrono::NaiveDate;
use reportdrop_transfer::{DEFAULT_CHUNK_SIZE, is_allowed};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{UploadError, ValidationError};
use crate::orchestrator::UploadOrchestrator;
use crate::registry::FileRegistry;
use crate::transport::ChunkTransport;
use crate::types::{BatchMetadata, BatchReport, FailedSlot, UploadEvent, UploadMode, UploadedSlot};

/// Submits the selected slots of a [`FileRegistry`] sequentially.
pub struct BatchCoordinator {
    registry: Arc<FileRegistry>,
    chunk_size: u64,
    mode: UploadMode,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<UploadEvent>>,
}

impl BatchCoordinator {
    pub fn new(registry: Arc<FileRegistry>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            registry,
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: UploadMode::Chunked,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_mode(mut self, mode: UploadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn registry(&self) -> &Arc<FileRegistry> {
        &self.registry
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Cancels every in-flight upload and stops the running batch from
    /// starting further slots. See [`FileRegistry::cancel_all`].
    pub fn cancel_all(&self) -> usize {
        self.registry.cancel_all()
    }

    /// Uploads every slot holding a file.
    ///
    /// Fails fast, without touching any slot, when the report date is
    /// missing, no file is selected, or a selected file is not allowed.
    pub async fn submit_all(
        &self,
        transport: &dyn ChunkTransport,
        metadata: &BatchMetadata,
    ) -> Result<BatchReport, UploadError> {
        let keys = self.registry.selected_keys();
        let date = self.check_preconditions(&keys, metadata)?;
        Ok(self.upload_keys(transport, &keys, date).await)
    }

    /// Uploads a single slot with the same checks and reporting as
    /// [`submit_all`](Self::submit_all).
    pub async fn submit_one(
        &self,
        key: &str,
        transport: &dyn ChunkTransport,
        metadata: &BatchMetadata,
    ) -> Result<BatchReport, UploadError> {
        let keys = [key.to_string()];
        let date = self.check_preconditions(&keys, metadata)?;
        if self.registry.file(key)?.is_none() {
            return Err(ValidationError::NoFile {
                key: key.to_string(),
            }
            .into());
        }
        Ok(self.upload_keys(transport, &keys, date).await)
    }

    fn check_preconditions(
        &self,
        keys: &[String],
        metadata: &BatchMetadata,
    ) -> Result<NaiveDate, UploadError> {
        let date = metadata
            .report_date
            .ok_or(ValidationError::MissingReportDate)?;
        if keys.is_empty() {
            return Err(ValidationError::NoFilesSelected.into());
        }
        for key in keys {
            if let Some(file) = self.registry.file(key)?
                && !is_allowed(&file)
            {
                return Err(ValidationError::FileTypeNotAllowed {
                    file_name: file.name().to_string(),
                }
                .into());
            }
        }
        Ok(date)
    }

    async fn upload_keys(
        &self,
        transport: &dyn ChunkTransport,
        keys: &[String],
        date: NaiveDate,
    ) -> BatchReport {
        let epoch = self.registry.cancel_epoch();
        let orchestrator = UploadOrchestrator::new(transport, &self.registry)
            .with_chunk_size(self.chunk_size)
            .with_events(&self.events_tx);
        let mut report = BatchReport::default();

        info!(files = keys.len(), %date, "batch started");
        for key in keys {
            let label = self
                .registry
                .label(key)
                .unwrap_or_else(|_| key.to_string());

            if self.registry.cancel_epoch() != epoch {
                warn!(slot = %key, "skipped after cancellation");
                report.failed.push(FailedSlot {
                    key: key.to_string(),
                    label,
                    error: UploadError::Aborted.display_message(),
                    aborted: true,
                });
                continue;
            }

            match orchestrator.run_with_mode(key, date, self.mode).await {
                Ok(()) => report.succeeded.push(UploadedSlot {
                    key: key.to_string(),
                    label,
                }),
                Err(e) => report.failed.push(FailedSlot {
                    key: key.to_string(),
                    label,
                    error: e.display_message(),
                    aborted: e.is_aborted(),
                }),
            }
        }
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "batch finished"
        );
        report
    }
}
