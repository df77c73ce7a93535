use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

pub type EntryId = u64;

/// File handed to the extractor: raw bytes plus name and declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

/// Structured fields the vision model returns for one receipt. Field names
/// follow the wire schema the model is constrained to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReceiptFields {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub merchant: String,
    pub description: String,
    /// Positive for purchases, negative for returns.
    pub total: f64,
    #[serde(default, rename = "cardLast4")]
    pub card_last4: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ExtractionCompleted {
        entry_id: EntryId,
        result: Result<ReceiptFields, ExtractError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractError {
    pub kind: ExtractFailureKind,
    pub message: String,
}

impl ExtractError {
    pub(crate) fn new(kind: ExtractFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFailureKind {
    /// No API key configured; checked before any network activity.
    MissingCredential,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The model returned data that violates the receipt schema.
    SchemaViolation,
    /// The model returned no candidate text at all.
    EmptyResponse,
}

impl fmt::Display for ExtractFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractFailureKind::MissingCredential => write!(f, "missing API key"),
            ExtractFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            ExtractFailureKind::Timeout => write!(f, "timeout"),
            ExtractFailureKind::Network => write!(f, "network error"),
            ExtractFailureKind::SchemaViolation => write!(f, "schema violation"),
            ExtractFailureKind::EmptyResponse => write!(f, "empty response"),
        }
    }
}
