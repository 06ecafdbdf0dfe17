// MemoryStore — in-process RecordStore for tests and dry runs.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::models::{EngagementEvent, RecordMap};
use super::traits::RecordStore;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<RecordMap>,
    events: Mutex<Vec<EngagementEvent>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: RecordMap) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Copy of the currently saved records.
    pub async fn snapshot(&self) -> RecordMap {
        self.records.lock().await.clone()
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self) -> RecordMap {
        self.records.lock().await.clone()
    }

    async fn save(&self, records: &RecordMap) -> Result<()> {
        *self.records.lock().await = records.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_events(&self) -> Vec<EngagementEvent> {
        self.events.lock().await.clone()
    }

    async fn append_events(&self, events: &[EngagementEvent]) -> Result<()> {
        self.events.lock().await.extend_from_slice(events);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
