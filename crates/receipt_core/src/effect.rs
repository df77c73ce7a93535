use crate::{EntryId, ReceiptRecord, SourceFile};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Dispatch the entry's file to the extraction engine.
    StartExtraction { entry_id: EntryId, file: SourceFile },
    /// Offer the original file for download under its archival name.
    /// The host computes the filename from the record; the core stays free
    /// of filesystem concerns.
    ArchiveOriginal {
        entry_id: EntryId,
        file: SourceFile,
        record: ReceiptRecord,
    },
    /// Write the full record list to durable storage.
    PersistRecords(Vec<ReceiptRecord>),
    /// Arrange for `Msg::NotificationTimerFired { token }` after the banner
    /// display period.
    ScheduleNotificationTimeout { token: u64 },
}
