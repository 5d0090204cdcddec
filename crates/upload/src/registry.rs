//! Report slots and their upload state.
//!
//! Each slot's file, status, progress and cancellation handle sit in one
//! record behind one lock, so they always change together. Every upload
//! attempt gets a fresh attempt number; writes carrying a superseded
//! attempt are dropped, which keeps a late chunk response from touching a
//! slot that was cancelled, cleared or restarted meanwhile.

use std::sync::{Mutex, MutexGuard, PoisonError};

use reportdrop_protocol::{ReportType, SlotStatus, default_report_types};
use reportdrop_transfer::{FileHandle, is_allowed};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{UploadError, ValidationError};
use crate::types::SlotSnapshot;

/// Handle for one upload attempt on one slot.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub key: String,
    pub label: String,
    pub attempt: u64,
    pub file: FileHandle,
    pub cancel: CancellationToken,
}

/// The fixed set of report slots for a session.
#[derive(Debug)]
pub struct FileRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    slots: Vec<Slot>,
    next_attempt: u64,
    /// Bumped by every `cancel_all`/`clear_all`.
    cancel_epoch: u64,
}

#[derive(Debug)]
struct Slot {
    report: ReportType,
    file: Option<FileHandle>,
    status: SlotStatus,
    progress: u8,
    active: Option<ActiveUpload>,
}

#[derive(Debug)]
struct ActiveUpload {
    attempt: u64,
    cancel: CancellationToken,
}

impl Slot {
    fn new(report: ReportType) -> Self {
        Self {
            report,
            file: None,
            status: SlotStatus::Pending,
            progress: 0,
            active: None,
        }
    }

    /// Signals and drops the live cancellation handle, if any.
    fn cancel_active(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    fn reset(&mut self) {
        self.cancel_active();
        self.status = SlotStatus::Pending;
        self.progress = 0;
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.active.as_ref().is_some_and(|a| a.attempt == attempt)
    }

    fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            key: self.report.key.clone(),
            label: self.report.label.clone(),
            file_name: self.file.as_ref().map(|f| f.name().to_string()),
            file_size: self.file.as_ref().map(FileHandle::size),
            status: self.status,
            progress: self.progress,
            loading: self.active.is_some(),
        }
    }
}

impl RegistryInner {
    fn slot(&self, key: &str) -> Result<&Slot, UploadError> {
        self.slots
            .iter()
            .find(|s| s.report.key == key)
            .ok_or_else(|| UploadError::UnknownSlot(key.to_string()))
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut Slot, UploadError> {
        self.slots
            .iter_mut()
            .find(|s| s.report.key == key)
            .ok_or_else(|| UploadError::UnknownSlot(key.to_string()))
    }

    /// The slot `ticket` was issued for, if the attempt is still live.
    fn current_mut(&mut self, ticket: &UploadTicket) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|s| s.report.key == ticket.key)
            .filter(|s| s.is_current(ticket.attempt))
    }
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::from_unique(default_report_types())
    }
}

impl FileRegistry {
    /// Creates one pending slot per report type. Keys must be unique.
    pub fn new(report_types: Vec<ReportType>) -> Result<Self, UploadError> {
        for (i, report) in report_types.iter().enumerate() {
            if report_types[..i].iter().any(|r| r.key == report.key) {
                return Err(UploadError::DuplicateSlot(report.key.clone()));
            }
        }
        Ok(Self::from_unique(report_types))
    }

    fn from_unique(report_types: Vec<ReportType>) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                slots: report_types.into_iter().map(Slot::new).collect(),
                next_attempt: 0,
                cancel_epoch: 0,
            }),
        }
    }

    /// Report types in slot order.
    pub fn report_types(&self) -> Vec<ReportType> {
        self.lock().slots.iter().map(|s| s.report.clone()).collect()
    }

    /// Human-readable label of a slot.
    pub fn label(&self, key: &str) -> Result<String, UploadError> {
        Ok(self.lock().slot(key)?.report.label.clone())
    }

    /// Places `file` in a slot after checking it against the allow-list.
    ///
    /// A rejected file unsets the slot's previous file. A slot that is
    /// uploading refuses new files.
    pub fn assign(&self, key: &str, file: FileHandle) -> Result<(), UploadError> {
        let mut inner = self.lock();
        let slot = inner.slot_mut(key)?;
        if slot.status == SlotStatus::Uploading {
            return Err(UploadError::SlotBusy(key.to_string()));
        }
        slot.reset();
        if !is_allowed(&file) {
            debug!(slot = %key, file = %file.name(), mime = %file.mime_type(), "file rejected");
            slot.file = None;
            return Err(ValidationError::FileTypeNotAllowed {
                file_name: file.name().to_string(),
            }
            .into());
        }
        debug!(slot = %key, file = %file.name(), bytes = file.size(), "file assigned");
        slot.file = Some(file);
        Ok(())
    }

    /// The file currently assigned to a slot.
    pub fn file(&self, key: &str) -> Result<Option<FileHandle>, UploadError> {
        Ok(self.lock().slot(key)?.file.clone())
    }

    /// Keys of slots holding a file, in slot order.
    pub fn selected_keys(&self) -> Vec<String> {
        self.lock()
            .slots
            .iter()
            .filter(|s| s.file.is_some())
            .map(|s| s.report.key.clone())
            .collect()
    }

    /// Starts an upload attempt on a slot.
    ///
    /// Any previous attempt's cancellation handle is signalled and
    /// discarded first. The slot becomes `Uploading` with progress 0.
    pub fn begin(&self, key: &str) -> Result<UploadTicket, UploadError> {
        let mut inner = self.lock();
        let attempt = inner.next_attempt;
        let slot = inner.slot_mut(key)?;
        let Some(file) = slot.file.clone() else {
            return Err(ValidationError::NoFile {
                key: key.to_string(),
            }
            .into());
        };
        if slot.cancel_active() {
            debug!(slot = %key, "previous attempt superseded");
        }

        let cancel = CancellationToken::new();
        slot.active = Some(ActiveUpload {
            attempt,
            cancel: cancel.clone(),
        });
        slot.status = SlotStatus::Uploading;
        slot.progress = 0;
        let label = slot.report.label.clone();
        inner.next_attempt += 1;

        Ok(UploadTicket {
            key: key.to_string(),
            label,
            attempt,
            file,
            cancel,
        })
    }

    /// Whether `ticket` is still the slot's live attempt.
    pub fn is_current(&self, ticket: &UploadTicket) -> bool {
        self.lock().current_mut(ticket).is_some()
    }

    /// Raises the slot's progress. Progress never decreases within an
    /// attempt. Returns `false` for a superseded attempt.
    pub fn record_progress(&self, ticket: &UploadTicket, progress: u8) -> bool {
        let mut inner = self.lock();
        let Some(slot) = inner.current_mut(ticket) else {
            return false;
        };
        slot.progress = slot.progress.max(progress.min(100));
        true
    }

    /// Marks the attempt `Uploaded` at 100%. Returns `false` for a
    /// superseded attempt.
    pub fn complete(&self, ticket: &UploadTicket) -> bool {
        let mut inner = self.lock();
        let Some(slot) = inner.current_mut(ticket) else {
            return false;
        };
        slot.active = None;
        slot.status = SlotStatus::Uploaded;
        slot.progress = 100;
        true
    }

    /// Marks the attempt `Failed`, keeping its partial progress. Returns
    /// `false` for a superseded attempt.
    pub fn fail(&self, ticket: &UploadTicket) -> bool {
        let mut inner = self.lock();
        let Some(slot) = inner.current_mut(ticket) else {
            return false;
        };
        slot.active = None;
        slot.status = SlotStatus::Failed;
        true
    }

    /// Signals every live cancellation handle and returns every slot that
    /// is not `Uploaded` to `Pending` at 0%. Assigned files are kept.
    ///
    /// Returns the number of in-flight attempts signalled.
    pub fn cancel_all(&self) -> usize {
        let mut inner = self.lock();
        inner.cancel_epoch += 1;
        let mut signalled = 0;
        for slot in &mut inner.slots {
            if slot.status == SlotStatus::Uploaded {
                continue;
            }
            if slot.cancel_active() {
                signalled += 1;
            }
            slot.status = SlotStatus::Pending;
            slot.progress = 0;
        }
        if signalled > 0 {
            info!(count = signalled, "uploads cancelled");
        }
        signalled
    }

    /// Removes a slot's file and returns it to `Pending`, cancelling any
    /// upload in flight.
    pub fn clear(&self, key: &str) -> Result<(), UploadError> {
        let mut inner = self.lock();
        let slot = inner.slot_mut(key)?;
        slot.reset();
        slot.file = None;
        Ok(())
    }

    /// [`clear`](Self::clear) for every slot. Idempotent.
    pub fn clear_all(&self) {
        let mut inner = self.lock();
        inner.cancel_epoch += 1;
        for slot in &mut inner.slots {
            slot.reset();
            slot.file = None;
        }
    }

    /// Counter advanced by every [`cancel_all`](Self::cancel_all) and
    /// [`clear_all`](Self::clear_all). A batch stops starting new slots
    /// once it changes.
    pub fn cancel_epoch(&self) -> u64 {
        self.lock().cancel_epoch
    }

    pub fn snapshot(&self, key: &str) -> Result<SlotSnapshot, UploadError> {
        Ok(self.lock().slot(key)?.snapshot())
    }

    /// Snapshots of every slot, in slot order.
    pub fn snapshots(&self) -> Vec<SlotSnapshot> {
        self.lock().slots.iter().map(Slot::snapshot).collect()
    }

    /// Whether the slot holds a live cancellation handle.
    pub fn is_loading(&self, key: &str) -> Result<bool, UploadError> {
        Ok(self.lock().slot(key)?.active.is_some())
    }

    pub fn is_any_uploading(&self) -> bool {
        self.lock()
            .slots
            .iter()
            .any(|s| s.status == SlotStatus::Uploading)
    }

    pub fn has_file_selected(&self) -> bool {
        self.lock().slots.iter().any(|s| s.file.is_some())
    }

    pub fn all_uploads_complete(&self) -> bool {
        self.lock()
            .slots
            .iter()
            .all(|s| s.status == SlotStatus::Uploaded)
    }

    /// Drops the live attempt of `key` if it is `attempt`, marking a slot
    /// still `Uploading` as `Failed`. Used when an upload is abandoned
    /// without reaching a terminal state.
    pub(crate) fn release(&self, key: &str, attempt: u64) -> bool {
        let mut inner = self.lock();
        let Ok(slot) = inner.slot_mut(key) else {
            return false;
        };
        if !slot.is_current(attempt) {
            return false;
        }
        slot.active = None;
        if slot.status == SlotStatus::Uploading {
            slot.status = SlotStatus::Failed;
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
