use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::view_model::{AppViewModel, EntryRowView};

pub type EntryId = u64;

/// Immutable handle to a user-submitted file: raw bytes plus the original
/// filename and declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Queued,
    Processing,
    Processed,
    Error,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Queued => write!(f, "queued"),
            EntryStatus::Processing => write!(f, "processing"),
            EntryStatus::Processed => write!(f, "processed"),
            EntryStatus::Error => write!(f, "error"),
        }
    }
}

/// One submitted file tracked through the processing lifecycle.
/// `result` is present iff `Processed`; `error` is present iff `Error`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub id: EntryId,
    pub file: SourceFile,
    pub status: EntryStatus,
    pub result: Option<ReceiptRecord>,
    pub error: Option<String>,
}

/// Structured transaction data extracted from one receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptRecord {
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: String,
    pub merchant: String,
    /// Short free text; the extractor is asked for five words or less, but
    /// edited records are not re-validated against that cap.
    pub description: String,
    /// Signed amount; negative for refunds/returns. Always finite.
    pub total: f64,
    /// Last four digits of the payment card, when visible on the receipt.
    pub card_last4: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IndexOutOfRange { index, len } => {
                write!(f, "record index {index} out of range (store has {len})")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Ordered, user-editable collection of extracted records.
///
/// Grows by append when an extraction succeeds; shrinks or mutates only via
/// explicit edit/delete. Decoupled from the queue: editing a record never
/// touches the entry it came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReceiptStore {
    records: Vec<ReceiptRecord>,
}

impl ReceiptStore {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, record: ReceiptRecord) {
        self.records.push(record);
    }

    pub fn update(&mut self, index: usize, record: ReceiptRecord) -> Result<(), StoreError> {
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        self.records[index] = record;
        Ok(())
    }

    /// Removes the record at `index`, shifting subsequent records down.
    pub fn delete(&mut self, index: usize) -> Result<ReceiptRecord, StoreError> {
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    pub fn snapshot(&self) -> Vec<ReceiptRecord> {
        self.records.clone()
    }
}

/// Selects between the two observed start behaviors: consume the queue as
/// soon as it is non-empty, or wait for an explicit start action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    pub auto_start: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self { auto_start: true }
    }
}

/// Transient failure banner. The token invalidates dismiss timers that
/// outlive the notification they were scheduled for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notification {
    pub message: String,
    pub token: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    entries: BTreeMap<EntryId, QueueEntry>,
    next_entry_id: EntryId,
    store: ReceiptStore,
    options: LoopOptions,
    armed: bool,
    notification: Option<Notification>,
    notification_seq: u64,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoopOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> LoopOptions {
        self.options
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub(crate) fn arm(&mut self) {
        self.armed = true;
    }

    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }

    /// Appends one `Queued` entry per file, after all existing entries,
    /// preserving the caller's ordering. Returns the assigned ids.
    pub(crate) fn submit_files(&mut self, files: Vec<SourceFile>) -> Vec<EntryId> {
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            self.next_entry_id += 1;
            let id = self.next_entry_id;
            self.entries.insert(
                id,
                QueueEntry {
                    id,
                    file,
                    status: EntryStatus::Queued,
                    result: None,
                    error: None,
                },
            );
            ids.push(id);
        }
        if !ids.is_empty() {
            self.dirty = true;
        }
        ids
    }

    pub(crate) fn has_processing(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.status == EntryStatus::Processing)
    }

    /// Lowest-id entry still waiting, i.e. the earliest submission.
    pub(crate) fn next_queued_id(&self) -> Option<EntryId> {
        self.entries
            .values()
            .find(|entry| entry.status == EntryStatus::Queued)
            .map(|entry| entry.id)
    }

    /// `Queued -> Processing`. Entries are replaced wholesale rather than
    /// patched in place, so snapshots handed out earlier stay consistent.
    pub(crate) fn begin_processing(&mut self, id: EntryId) -> Option<SourceFile> {
        let current = self.entries.get(&id)?;
        if current.status != EntryStatus::Queued {
            return None;
        }
        let next = QueueEntry {
            status: EntryStatus::Processing,
            ..current.clone()
        };
        let file = next.file.clone();
        self.entries.insert(id, next);
        self.dirty = true;
        Some(file)
    }

    /// `Processing -> Processed`. Ignored for entries not currently in
    /// flight, so late or duplicate engine events cannot revive a terminal
    /// entry.
    pub(crate) fn complete_entry(&mut self, id: EntryId, record: ReceiptRecord) -> Option<SourceFile> {
        let current = self.entries.get(&id)?;
        if current.status != EntryStatus::Processing {
            return None;
        }
        let next = QueueEntry {
            status: EntryStatus::Processed,
            result: Some(record),
            ..current.clone()
        };
        let file = next.file.clone();
        self.entries.insert(id, next);
        self.dirty = true;
        Some(file)
    }

    /// `Processing -> Error`.
    pub(crate) fn fail_entry(&mut self, id: EntryId, message: String) -> bool {
        let Some(current) = self.entries.get(&id) else {
            return false;
        };
        if current.status != EntryStatus::Processing {
            return false;
        }
        let next = QueueEntry {
            status: EntryStatus::Error,
            error: Some(message),
            ..current.clone()
        };
        self.entries.insert(id, next);
        self.dirty = true;
        true
    }

    pub fn store(&self) -> &ReceiptStore {
        &self.store
    }

    pub(crate) fn store_append(&mut self, record: ReceiptRecord) {
        self.store.append(record);
        self.dirty = true;
    }

    pub(crate) fn store_update(
        &mut self,
        index: usize,
        record: ReceiptRecord,
    ) -> Result<(), StoreError> {
        self.store.update(index, record)?;
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn store_delete(&mut self, index: usize) -> Result<ReceiptRecord, StoreError> {
        let removed = self.store.delete(index)?;
        self.dirty = true;
        Ok(removed)
    }

    pub(crate) fn restore_records(&mut self, records: Vec<ReceiptRecord>) {
        if records.is_empty() {
            return;
        }
        for record in records {
            self.store.append(record);
        }
        self.dirty = true;
    }

    pub fn records_snapshot(&self) -> Vec<ReceiptRecord> {
        self.store.snapshot()
    }

    pub(crate) fn raise_notification(&mut self, message: String) -> u64 {
        self.notification_seq += 1;
        let token = self.notification_seq;
        self.notification = Some(Notification { message, token });
        self.dirty = true;
        token
    }

    pub(crate) fn clear_notification(&mut self) {
        if self.notification.take().is_some() {
            self.dirty = true;
        }
    }

    /// Clears the banner only if the timer belongs to it; a timer scheduled
    /// for an earlier banner must not dismiss a newer one.
    pub(crate) fn dismiss_notification_if(&mut self, token: u64) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| n.token == token)
        {
            self.notification = None;
            self.dirty = true;
        }
    }

    pub fn view(&self) -> AppViewModel {
        let entries: Vec<EntryRowView> = self
            .entries
            .values()
            .map(|entry| EntryRowView {
                id: entry.id,
                filename: entry.file.name.clone(),
                status: entry.status,
                error: entry.error.clone(),
            })
            .collect();
        let queued = self
            .entries
            .values()
            .filter(|e| e.status == EntryStatus::Queued)
            .count();
        let processing = self
            .entries
            .values()
            .filter(|e| e.status == EntryStatus::Processing)
            .count();
        AppViewModel {
            entries,
            records: self.store.snapshot(),
            notification: self.notification.as_ref().map(|n| n.message.clone()),
            armed: self.armed,
            queued,
            processing,
            dirty: self.dirty,
        }
    }

    pub fn entry(&self, id: EntryId) -> Option<&QueueEntry> {
        self.entries.get(&id)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether a redraw is pending and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
