//! Receipt engine: extraction I/O, export formatting, and persistence helpers.
mod engine;
mod export;
mod extract;
mod filename;
mod persist;
mod types;

pub use engine::EngineHandle;
pub use export::{export_filename, to_delimited_text, Delimiter, EXPORT_HEADERS};
pub use extract::{ExtractSettings, Extractor, GeminiExtractor};
pub use filename::archival_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{
    EngineEvent, EntryId, ExtractError, ExtractFailureKind, ExtractionRequest, ReceiptFields,
};
