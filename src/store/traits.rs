// RecordStore trait — backend-agnostic async interface for outreach state.
//
// The contract is deliberately coarse: load everything, mutate in memory,
// save everything. Stores do not coordinate concurrent writers; callers hold
// a PassLock (see lock.rs) around any load/mutate/save cycle.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{EngagementEvent, RecordMap};

#[async_trait]
pub trait RecordStore: Send + Sync {
    // --- Records ---

    /// Load every tracked record. Never fails: an unreadable backing store
    /// is logged and reported as empty.
    async fn load(&self) -> RecordMap;

    /// Load every tracked record, failing if the backing store exists but
    /// can't be read. A store that doesn't exist yet loads as empty.
    ///
    /// Paths that create records use this instead of `load`: saving over
    /// an unreadable store would erase every recipient's history.
    async fn load_checked(&self) -> Result<RecordMap> {
        Ok(self.load().await)
    }

    /// Replace the stored records with `records`.
    async fn save(&self, records: &RecordMap) -> Result<()>;

    // --- Event log ---

    /// Load the event log. Fails soft like `load`.
    async fn load_events(&self) -> Vec<EngagementEvent>;

    /// Append events to the log.
    async fn append_events(&self, events: &[EngagementEvent]) -> Result<()>;

    /// Human-readable location of the backing store, for status output.
    fn location(&self) -> String;
}
