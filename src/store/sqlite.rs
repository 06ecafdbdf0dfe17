// SqliteStore — rusqlite backend implementing the RecordStore trait.
//
// Each record is stored as its JSON document in a row keyed by email, so the
// record shape can evolve without migrations. The Connection is wrapped in a
// tokio Mutex because it is !Sync; the lock is never held across an await.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::warn;

use super::models::{record_key, EngagementEvent, OutreachRecord, RecordMap};
use super::traits::RecordStore;

pub const DB_FILE: &str = "outreach.db";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and create tables.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory for database: {}", path.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        create_tables(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            location: path.display().to_string(),
        })
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            location: ":memory:".to_string(),
        })
    }
}

/// Create all tables if they don't exist yet. Idempotent.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- One row per tracked recipient; the record itself is a JSON document
        CREATE TABLE IF NOT EXISTS outreach_records (
            email TEXT PRIMARY KEY,            -- lower-cased address
            record TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Append-only engagement event log
        CREATE TABLE IF NOT EXISTS engagement_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event TEXT NOT NULL,               -- JSON-encoded EngagementEvent
            recorded_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )
    .context("Failed to create tables")?;
    Ok(())
}

fn query_records(conn: &Connection) -> Result<RecordMap> {
    let mut stmt = conn.prepare("SELECT email, record FROM outreach_records ORDER BY email")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut records = RecordMap::new();
    for row in rows {
        let (email, json) = row?;
        match serde_json::from_str::<OutreachRecord>(&json) {
            Ok(record) => {
                records.entry(record_key(&email)).or_insert(record);
            }
            Err(e) => warn!(email = %email, error = %e, "Skipping unreadable record row"),
        }
    }
    Ok(records)
}

fn query_events(conn: &Connection) -> Result<Vec<EngagementEvent>> {
    let mut stmt = conn.prepare("SELECT event FROM engagement_events ORDER BY id")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut events = Vec::new();
    for row in rows {
        match serde_json::from_str::<EngagementEvent>(&row?) {
            Ok(event) => events.push(event),
            Err(e) => warn!(error = %e, "Skipping unreadable event row"),
        }
    }
    Ok(events)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn load(&self) -> RecordMap {
        let conn = self.conn.lock().await;
        query_records(&conn).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load records, treating as empty");
            RecordMap::new()
        })
    }

    async fn load_checked(&self) -> Result<RecordMap> {
        let conn = self.conn.lock().await;
        query_records(&conn).context("Failed to load records")
    }

    async fn save(&self, records: &RecordMap) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM outreach_records", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO outreach_records (email, record) VALUES (?1, ?2)")?;
            for (email, record) in records {
                stmt.execute(params![email, serde_json::to_string(record)?])?;
            }
        }
        tx.commit().context("Failed to commit records")?;
        Ok(())
    }

    async fn load_events(&self) -> Vec<EngagementEvent> {
        let conn = self.conn.lock().await;
        query_events(&conn).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load events, treating as empty");
            Vec::new()
        })
    }

    async fn append_events(&self, events: &[EngagementEvent]) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO engagement_events (event) VALUES (?1)")?;
            for event in events {
                stmt.execute(params![serde_json::to_string(event)?])?;
            }
        }
        tx.commit().context("Failed to commit events")?;
        Ok(())
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}
