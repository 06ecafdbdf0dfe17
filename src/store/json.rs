// JsonFileStore — whole-file JSON documents on local disk.
//
// Records live in one JSON object keyed by email, events in one JSON array.
// Every save rewrites the full document through a temp file + rename so a
// crash mid-write never leaves a truncated store behind.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::models::{EngagementEvent, RecordMap};
use super::traits::RecordStore;

pub const RECORDS_FILE: &str = "followup_tracking.json";
pub const EVENTS_FILE: &str = "events.json";

pub struct JsonFileStore {
    records_path: PathBuf,
    events_path: PathBuf,
}

impl JsonFileStore {
    /// Store rooted in `data_dir`, using the standard file names.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_paths(data_dir.join(RECORDS_FILE), data_dir.join(EVENTS_FILE))
    }

    pub fn with_paths(records_path: PathBuf, events_path: PathBuf) -> Self {
        Self {
            records_path,
            events_path,
        }
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> RecordMap {
        match read_document(&self.records_path).await {
            Some(document) => super::decode_records(document),
            None => RecordMap::new(),
        }
    }

    async fn load_checked(&self) -> Result<RecordMap> {
        match read_document_checked(&self.records_path).await? {
            Some(document) => super::decode_records_checked(document)
                .with_context(|| format!("{} is damaged", self.records_path.display())),
            None => Ok(RecordMap::new()),
        }
    }

    async fn save(&self, records: &RecordMap) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(&self.records_path, json.as_bytes()).await
    }

    async fn load_events(&self) -> Vec<EngagementEvent> {
        match read_document(&self.events_path).await {
            Some(document) => super::decode_events(document),
            None => Vec::new(),
        }
    }

    async fn append_events(&self, events: &[EngagementEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        let mut log = self.load_events().await;
        log.extend_from_slice(events);
        let json = serde_json::to_string_pretty(&log)?;
        write_atomic(&self.events_path, json.as_bytes()).await
    }

    fn location(&self) -> String {
        self.records_path.display().to_string()
    }
}

/// Read and parse a JSON document, returning None (with a log line) when the
/// file is missing or damaged.
pub(crate) async fn read_document(path: &Path) -> Option<Value> {
    match read_document_checked(path).await {
        Ok(Some(document)) => Some(document),
        Ok(None) => {
            debug!(path = %path.display(), "Store file not found, starting empty");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Treating store file as empty");
            None
        }
    }
}

/// Read and parse a JSON document. A missing file is `Ok(None)`; a file that
/// can't be read or isn't valid JSON is an error.
pub(crate) async fn read_document_checked(path: &Path) -> Result<Option<Value>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let document = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(Some(document))
}

/// Write `data` to `path` via a sibling temp file and rename.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

    tokio::fs::write(&tmp_path, data)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}
