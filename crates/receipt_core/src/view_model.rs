use crate::{EntryId, EntryStatus, ReceiptRecord};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub entries: Vec<EntryRowView>,
    pub records: Vec<ReceiptRecord>,
    /// Message of the active failure banner, if one is showing.
    pub notification: Option<String>,
    pub armed: bool,
    pub queued: usize,
    pub processing: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRowView {
    pub id: EntryId,
    pub filename: String,
    pub status: EntryStatus,
    pub error: Option<String>,
}
