use crate::{EntryId, ReceiptRecord, SourceFile};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted one or more receipt files for processing.
    FilesSubmitted(Vec<SourceFile>),
    /// User clicked Start to arm the processing loop.
    StartClicked,
    /// Engine finished extracting an entry successfully.
    ExtractionSucceeded {
        entry_id: EntryId,
        record: ReceiptRecord,
    },
    /// Engine failed to extract an entry.
    ExtractionFailed { entry_id: EntryId, message: String },
    /// User replaced the record at a store position.
    RecordEdited { index: usize, record: ReceiptRecord },
    /// User deleted the record at a store position.
    RecordDeleted { index: usize },
    /// Restore previously persisted records at startup.
    RestoreRecords(Vec<ReceiptRecord>),
    /// The auto-dismiss timer for the failure banner fired.
    NotificationTimerFired { token: u64 },
    /// User dismissed the failure banner by hand.
    NotificationDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
