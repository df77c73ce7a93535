use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pipeline_logging::{pipeline_error, pipeline_info, pipeline_warn};
use receipt_core::{Effect, Msg, ReceiptRecord, SourceFile};
use receipt_engine::{
    archival_filename, AtomicFileWriter, EngineEvent, EngineHandle, ExtractSettings,
    ExtractionRequest, ReceiptFields,
};

use crate::persistence;

/// Banner display period before auto-dismiss.
const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

pub struct EffectRunner {
    engine: EngineHandle,
    output_dir: PathBuf,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(settings: ExtractSettings, output_dir: PathBuf, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            engine: EngineHandle::new(settings),
            output_dir,
            msg_tx,
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartExtraction { entry_id, file } => {
                    pipeline_info!("entry {}: extracting {}", entry_id, file.name);
                    self.engine.extract(
                        entry_id,
                        ExtractionRequest {
                            file_name: file.name,
                            media_type: file.media_type,
                            bytes: file.bytes,
                        },
                    );
                }
                Effect::ArchiveOriginal {
                    entry_id,
                    file,
                    record,
                } => self.archive_original(entry_id, &file, &record),
                Effect::PersistRecords(records) => {
                    persistence::save_records(&self.output_dir, &records);
                }
                Effect::ScheduleNotificationTimeout { token } => {
                    let tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(NOTIFICATION_TIMEOUT);
                        let _ = tx.send(Msg::NotificationTimerFired { token });
                    });
                }
            }
        }
    }

    /// Polls one engine completion and maps it onto a core message.
    pub fn poll_engine(&self) -> Option<Msg> {
        let EngineEvent::ExtractionCompleted { entry_id, result } = self.engine.try_recv()?;
        Some(match result {
            Ok(fields) => Msg::ExtractionSucceeded {
                entry_id,
                record: fields_to_record(fields),
            },
            Err(err) => {
                pipeline_warn!("entry {} failed: {} ({})", entry_id, err, err.kind);
                eprintln!("extraction failed: {err}");
                Msg::ExtractionFailed {
                    entry_id,
                    message: err.to_string(),
                }
            }
        })
    }

    /// Writes a copy of the original file under its archival name. The CLI
    /// stand-in for the browser's renamed-download side effect.
    fn archive_original(&self, entry_id: u64, file: &SourceFile, record: &ReceiptRecord) {
        let name = archival_filename(&record_to_fields(record), &file.name);
        let writer = AtomicFileWriter::new(self.output_dir.join("archive"));
        match writer.write(&name, &file.bytes) {
            Ok(path) => pipeline_info!("entry {}: archived original as {:?}", entry_id, path),
            Err(err) => {
                pipeline_error!("entry {}: failed to archive original: {}", entry_id, err);
            }
        }
    }
}

pub(crate) fn record_to_fields(record: &ReceiptRecord) -> ReceiptFields {
    ReceiptFields {
        date: record.date.clone(),
        merchant: record.merchant.clone(),
        description: record.description.clone(),
        total: record.total,
        card_last4: record.card_last4.clone(),
    }
}

pub(crate) fn fields_to_record(fields: ReceiptFields) -> ReceiptRecord {
    ReceiptRecord {
        date: fields.date,
        merchant: fields.merchant,
        description: fields.description,
        total: fields.total,
        card_last4: fields.card_last4,
    }
}
