use std::fs;
use std::path::Path;

use pipeline_logging::{pipeline_error, pipeline_info, pipeline_warn};
use receipt_core::ReceiptRecord;
use receipt_engine::AtomicFileWriter;
use serde::{Deserialize, Serialize};

/// Fixed key under which the record list is durably stored.
const STATE_FILENAME: &str = ".receipts_state.json";

/// Mirror of [`ReceiptRecord`] so the core stays serde-free.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedRecord {
    date: String,
    merchant: String,
    description: String,
    total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    card_last4: Option<String>,
}

/// Loads the persisted record list. Absence and malformed content both fall
/// back to an empty store; corruption is never fatal.
pub(crate) fn load_records(output_dir: &Path) -> Vec<ReceiptRecord> {
    let path = output_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Vec::new();
        }
        Err(err) => {
            pipeline_warn!("Failed to read persisted records from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    let records: Vec<PersistedRecord> = match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(err) => {
            pipeline_warn!("Failed to parse persisted records from {:?}: {}", path, err);
            return Vec::new();
        }
    };

    pipeline_info!("Loaded {} persisted records from {:?}", records.len(), path);
    records
        .into_iter()
        .map(|record| ReceiptRecord {
            date: record.date,
            merchant: record.merchant,
            description: record.description,
            total: record.total,
            card_last4: record.card_last4,
        })
        .collect()
}

pub(crate) fn save_records(output_dir: &Path, records: &[ReceiptRecord]) {
    let persisted: Vec<PersistedRecord> = records
        .iter()
        .map(|record| PersistedRecord {
            date: record.date.clone(),
            merchant: record.merchant.clone(),
            description: record.description.clone(),
            total: record.total,
            card_last4: record.card_last4.clone(),
        })
        .collect();

    let content = match serde_json::to_string_pretty(&persisted) {
        Ok(text) => text,
        Err(err) => {
            pipeline_error!("Failed to serialize records: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    if let Err(err) = writer.write(STATE_FILENAME, content.as_bytes()) {
        pipeline_error!("Failed to write records to {:?}: {}", output_dir, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(merchant: &str) -> ReceiptRecord {
        ReceiptRecord {
            date: "2024-03-01".to_string(),
            merchant: merchant.to_string(),
            description: "coffee".to_string(),
            total: -4.5,
            card_last4: Some("4242".to_string()),
        }
    }

    #[test]
    fn records_round_trip_through_the_state_file() {
        let dir = tempfile::TempDir::new().unwrap();
        save_records(dir.path(), &[record("Acme"), record("Bravo")]);

        let loaded = load_records(dir.path());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].merchant, "Acme");
        assert_eq!(loaded[0].total, -4.5);
        assert_eq!(loaded[1].card_last4.as_deref(), Some("4242"));
    }

    #[test]
    fn missing_state_file_yields_empty_store() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load_records(dir.path()).is_empty());
    }

    #[test]
    fn malformed_state_file_falls_back_to_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(STATE_FILENAME), "{not json").unwrap();
        assert!(load_records(dir.path()).is_empty());
    }
}
