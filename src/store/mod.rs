// Record store — where outreach history and engagement events live.
//
// The RecordStore trait is the seam: the JSON file backend mirrors the
// on-disk format the rest of the tooling already reads, SQLite is available
// behind the `sqlite` feature, and the in-memory backend exists for tests.
//
// Loads fail soft. A missing or damaged store is logged and treated as empty
// so a bad file means "no work this pass", never a crash.

pub mod json;
pub mod lock;
pub mod memory;
pub mod models;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod timestamp;
pub mod traits;

pub use traits::RecordStore;

use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use models::{record_key, EngagementEvent, OutreachRecord, RecordMap};

/// Decode a records document, dropping entries that can't be read.
///
/// Keys are lower-cased; when two keys collide after lower-casing the first
/// one (in document order of the sorted map) wins. A document that isn't an
/// object decodes as empty.
pub fn decode_records(document: Value) -> RecordMap {
    decode_records_checked(document).unwrap_or_else(|e| {
        warn!(error = %e, "Treating record store as empty");
        RecordMap::new()
    })
}

/// Like `decode_records`, but a document that isn't a JSON object is an
/// error instead of an empty map. Individual bad entries are still skipped.
pub fn decode_records_checked(document: Value) -> anyhow::Result<RecordMap> {
    let Value::Object(entries) = document else {
        anyhow::bail!("Record store is not a JSON object");
    };

    let mut records = RecordMap::new();
    for (email, raw) in entries {
        let key = record_key(&email);
        if key.is_empty() {
            warn!("Skipping record with an empty key");
            continue;
        }
        match serde_json::from_value::<OutreachRecord>(raw) {
            Ok(record) => {
                if records.contains_key(&key) {
                    warn!(email = %key, "Duplicate record key after normalization, keeping first");
                    continue;
                }
                records.insert(key, record);
            }
            Err(e) => warn!(email = %key, error = %e, "Skipping unreadable record"),
        }
    }
    Ok(records)
}

/// Decode an event log document, dropping entries with unknown types.
pub fn decode_events(document: Value) -> Vec<EngagementEvent> {
    let Value::Array(entries) = document else {
        warn!("Event log is not a JSON array, treating as empty");
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<EngagementEvent>(raw) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable event");
                None
            }
        })
        .collect()
}

/// Which backend to use for records and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Whole-file JSON documents in the data directory (default)
    Json,
    /// Embedded SQLite database in the data directory
    Sqlite,
}

/// Open the configured backend rooted at `data_dir`.
pub fn open(backend: StoreBackend, data_dir: &Path) -> anyhow::Result<Arc<dyn RecordStore>> {
    match backend {
        StoreBackend::Json => Ok(Arc::new(json::JsonFileStore::new(data_dir))),
        StoreBackend::Sqlite => open_sqlite(data_dir),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(data_dir: &Path) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store = sqlite::SqliteStore::open(&data_dir.join(sqlite::DB_FILE))?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_data_dir: &Path) -> anyhow::Result<Arc<dyn RecordStore>> {
    anyhow::bail!(
        "OUTREACH_STORE=sqlite but the 'sqlite' feature is not compiled in.\n\
         Rebuild with: cargo build --features sqlite"
    )
}
