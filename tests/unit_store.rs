// Unit tests for the record store backends.
//
// JSON file store: fail-soft loads, key normalization, lenient fields,
// whole-document writes. SQLite store (feature "sqlite"): same contract.

mod common;

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::fs;

use common::{fixed_now, record_sent_days_ago, records};
use outreach::store::json::{JsonFileStore, EVENTS_FILE, RECORDS_FILE};
use outreach::store::models::{EngagementEvent, EventKind, DEFAULT_COMPANY_NAME, DEFAULT_FIRST_NAME};
use outreach::store::{decode_records, open, RecordStore, StoreBackend};

// ============================================================
// decode_records
// ============================================================

#[test]
fn decode_lowercases_keys_and_drops_non_objects() {
    let doc = json!({
        "Dana@Glow.com": {"initial_sent": "2025-06-01T09:00:00"},
        "broken@x.com": "not a record",
        "also-broken@x.com": 42,
    });

    let map = decode_records(doc);

    assert_eq!(map.len(), 1);
    assert!(map.contains_key("dana@glow.com"));
}

#[test]
fn decode_fills_defaults_for_missing_and_null_fields() {
    let doc = json!({
        "a@x.com": {
            "initial_sent": "2025-06-01T09:00:00.123456",
            "company_name": null,
            "replied": null,
            "followup_1_sent": null
        }
    });

    let record = &decode_records(doc)["a@x.com"];

    assert_eq!(record.company_name, DEFAULT_COMPANY_NAME);
    assert_eq!(record.first_name, DEFAULT_FIRST_NAME);
    assert!(!record.replied);
    assert_eq!(record.followup_1_sent, None);
    assert_eq!(record.sequence, None);
}

#[test]
fn naive_timestamps_are_read_as_utc() {
    let doc = json!({"a@x.com": {"initial_sent": "2025-06-01T09:00:00"}});
    let record = &decode_records(doc)["a@x.com"];
    assert_eq!(
        record.initial_sent,
        Some(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
    );
}

#[test]
fn garbage_timestamp_reads_as_absent() {
    let doc = json!({"a@x.com": {"initial_sent": "last tuesday", "opened": true}});
    let record = &decode_records(doc)["a@x.com"];
    assert_eq!(record.initial_sent, None);
    assert!(record.opened);
}

#[test]
fn non_object_document_is_empty() {
    assert!(decode_records(json!([1, 2, 3])).is_empty());
}

// ============================================================
// JsonFileStore
// ============================================================

#[tokio::test]
async fn missing_files_load_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    assert!(store.load().await.is_empty());
    assert!(store.load_events().await.is_empty());
}

#[tokio::test]
async fn corrupt_files_load_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(RECORDS_FILE), "{not json").unwrap();
    fs::write(dir.path().join(EVENTS_FILE), "[{\"type\": ").unwrap();
    let store = JsonFileStore::new(dir.path());

    assert!(store.load().await.is_empty());
    assert!(store.load_events().await.is_empty());
}

#[tokio::test]
async fn checked_load_treats_missing_file_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    assert!(store.load_checked().await.unwrap().is_empty());
}

#[tokio::test]
async fn checked_load_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(RECORDS_FILE), "{\"a@x.com\": {").unwrap();
    let store = JsonFileStore::new(dir.path());

    assert!(store.load_checked().await.is_err());
    // The fail-soft path still reads it as empty
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn checked_load_rejects_non_object_document() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(RECORDS_FILE), "[1, 2, 3]").unwrap();
    let store = JsonFileStore::new(dir.path());
    assert!(store.load_checked().await.is_err());
}

#[tokio::test]
async fn checked_load_skips_bad_entries_but_keeps_good_ones() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(RECORDS_FILE),
        r#"{"A@x.com": {"initial_sent": "2025-06-01T09:00:00"}, "b@x.com": 7}"#,
    )
    .unwrap();
    let store = JsonFileStore::new(dir.path());

    let map = store.load_checked().await.unwrap();
    assert_eq!(map.len(), 1);
    assert!(map.contains_key("a@x.com"));
}

#[tokio::test]
async fn save_then_load_preserves_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let now = fixed_now();
    let mut record = record_sent_days_ago(now, 4).with_sequence("hiring");
    record.followup_1_sent = Some(now);
    record.opened = true;
    let map = records(vec![("dana@glow.com", record)]);

    store.save(&map).await.unwrap();

    assert_eq!(store.load().await, map);
}

#[tokio::test]
async fn saved_file_is_an_email_keyed_object() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let now = fixed_now();
    store
        .save(&records(vec![("a@x.com", record_sent_days_ago(now, 1))]))
        .await
        .unwrap();

    let raw = fs::read_to_string(dir.path().join(RECORDS_FILE)).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &doc["a@x.com"];
    assert!(entry["initial_sent"].as_str().unwrap().ends_with('Z'));
    assert!(entry["followup_1_sent"].is_null());
    assert_eq!(entry["replied"], json!(false));
    // No temp files left behind
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn save_creates_missing_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = JsonFileStore::new(&nested);
    store.save(&records(vec![])).await.unwrap();
    assert!(nested.join(RECORDS_FILE).exists());
}

#[tokio::test]
async fn events_append_across_calls() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let first = EngagementEvent::new(EventKind::Opened, Some("a@x.com"), Some(fixed_now()));
    let second = EngagementEvent::new(EventKind::Bounced, None, None);

    store.append_events(&[first.clone()]).await.unwrap();
    store.append_events(&[second.clone()]).await.unwrap();

    assert_eq!(store.load_events().await, vec![first, second]);
}

#[tokio::test]
async fn legacy_event_log_without_recipients_loads() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(EVENTS_FILE),
        r#"[{"type": "opened", "timestamp": "2025-06-01T10:00:00"}, {"type": "mystery"}]"#,
    )
    .unwrap();
    let store = JsonFileStore::new(dir.path());

    let events = store.load_events().await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Opened);
    assert_eq!(events[0].recipient, None);
}

#[tokio::test]
async fn open_json_backend_uses_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(StoreBackend::Json, dir.path()).unwrap();
    assert!(store.location().ends_with(RECORDS_FILE));
}

// ============================================================
// SqliteStore
// ============================================================

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use outreach::store::sqlite::{SqliteStore, DB_FILE};

    #[tokio::test]
    async fn empty_database_loads_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load().await.is_empty());
        assert!(store.load_events().await.is_empty());
    }

    #[tokio::test]
    async fn save_replaces_whole_document() {
        let store = SqliteStore::open_in_memory().unwrap();
        let now = fixed_now();

        store
            .save(&records(vec![
                ("a@x.com", record_sent_days_ago(now, 1)),
                ("b@x.com", record_sent_days_ago(now, 2)),
            ]))
            .await
            .unwrap();
        let second = records(vec![("c@x.com", record_sent_days_ago(now, 3))]);
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await, second);
    }

    #[tokio::test]
    async fn events_round_trip_in_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let events = vec![
            EngagementEvent::new(EventKind::Opened, Some("a@x.com"), Some(fixed_now())),
            EngagementEvent::new(EventKind::Unsubscribed, None, None),
        ];
        store.append_events(&events).await.unwrap();
        assert_eq!(store.load_events().await, events);
    }

    #[tokio::test]
    async fn open_sqlite_backend_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(StoreBackend::Sqlite, dir.path()).unwrap();
        store
            .save(&records(vec![("a@x.com", record_sent_days_ago(fixed_now(), 1))]))
            .await
            .unwrap();
        assert!(dir.path().join(DB_FILE).exists());
        assert_eq!(store.load().await.len(), 1);
    }
}
