// Engagement event ingestion.
//
// Provider webhooks are captured to disk by whatever receives them; this
// module turns those payloads into EngagementEvents, tags each with the
// recipient it belongs to, raises the matching flags on the recipient's
// record, and appends the events to the log.
//
// Flags only ever go from false to true. Replies don't arrive as provider
// events, so they are recorded by hand via `mark_replied`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::store::models::{record_key, EngagementEvent, EventKind, RecordMap};
use crate::store::timestamp;
use crate::store::RecordStore;

/// Parse one payload document: a single event or an array of them.
///
/// Each item may be a Mailgun webhook body (`{"event-data": {...}}`), a bare
/// Mailgun event (`{"event": ...}`), or an already-normalized event
/// (`{"type": ...}`). Items that aren't engagement signals are skipped.
pub fn parse_payload(document: &Value) -> Vec<EngagementEvent> {
    match document {
        Value::Array(items) => items.iter().filter_map(parse_item).collect(),
        item => parse_item(item).into_iter().collect(),
    }
}

fn parse_item(item: &Value) -> Option<EngagementEvent> {
    let data = item.get("event-data").unwrap_or(item);

    let kind = if let Some(name) = data.get("type").and_then(Value::as_str) {
        EventKind::from_name(name)
    } else {
        let name = data.get("event").and_then(Value::as_str)?;
        let severity = data.get("severity").and_then(Value::as_str);
        mailgun_kind(name, severity)
    };
    let Some(kind) = kind else {
        debug!(event = ?data.get("event").or(data.get("type")), "Ignoring non-engagement event");
        return None;
    };

    let recipient = data.get("recipient").and_then(Value::as_str);
    let timestamp = match data.get("timestamp") {
        Some(Value::String(s)) => timestamp::parse_timestamp(s),
        Some(Value::Number(n)) => n.as_f64().and_then(timestamp::from_epoch_seconds),
        _ => None,
    };

    Some(EngagementEvent::new(kind, recipient, timestamp))
}

/// Map a Mailgun event name onto an engagement kind.
///
/// Only permanent failures count as bounces; temporary ones are retried by
/// the provider and may still deliver.
pub fn mailgun_kind(event: &str, severity: Option<&str>) -> Option<EventKind> {
    match event {
        "opened" => Some(EventKind::Opened),
        "clicked" => Some(EventKind::Clicked),
        "complained" => Some(EventKind::Complained),
        "unsubscribed" => Some(EventKind::Unsubscribed),
        "bounced" => Some(EventKind::Bounced),
        "failed" if severity == Some("permanent") => Some(EventKind::Bounced),
        _ => None,
    }
}

/// Outcome of applying a batch of events to the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    /// Flags that flipped from false to true
    pub flags_set: usize,
    /// Events with no recipient, or a recipient we don't track
    pub unmatched: usize,
}

/// Raise engagement flags for each event's recipient.
pub fn apply_events(records: &mut RecordMap, events: &[EngagementEvent]) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();
    for event in events {
        let Some(record) = event
            .recipient
            .as_deref()
            .and_then(|email| records.get_mut(email))
        else {
            outcome.unmatched += 1;
            continue;
        };

        let flag = match event.kind {
            EventKind::Opened => &mut record.opened,
            EventKind::Clicked => &mut record.clicked,
            // Logged for metrics only; no record flag
            EventKind::Bounced | EventKind::Complained | EventKind::Unsubscribed => continue,
        };
        if !*flag {
            *flag = true;
            outcome.flags_set += 1;
        }
    }
    outcome
}

/// Mark a recipient as having replied. Returns false if they aren't tracked.
pub fn mark_replied(records: &mut RecordMap, email: &str) -> bool {
    match records.get_mut(&record_key(email)) {
        Some(record) => {
            record.replied = true;
            true
        }
        None => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub received: usize,
    pub flags_set: usize,
    pub unmatched: usize,
}

/// Apply `events` to the store and append them to the event log.
pub async fn ingest(store: &dyn RecordStore, events: &[EngagementEvent]) -> Result<IngestSummary> {
    let mut summary = IngestSummary {
        received: events.len(),
        ..IngestSummary::default()
    };
    if events.is_empty() {
        return Ok(summary);
    }

    let mut records = store.load().await;
    let outcome = apply_events(&mut records, events);
    summary.flags_set = outcome.flags_set;
    summary.unmatched = outcome.unmatched;

    if outcome.flags_set > 0 {
        store
            .save(&records)
            .await
            .context("Failed to save engagement flags")?;
    }
    store
        .append_events(events)
        .await
        .context("Failed to append to event log")?;

    if outcome.unmatched > 0 {
        warn!(unmatched = outcome.unmatched, "Some events matched no tracked recipient");
    }
    info!(
        received = summary.received,
        flags_set = summary.flags_set,
        "Ingested engagement events"
    );
    Ok(summary)
}

/// Record a reply for `email` and save. Returns false if they aren't tracked.
pub async fn record_reply(store: &dyn RecordStore, email: &str) -> Result<bool> {
    let mut records = store.load().await;
    if !mark_replied(&mut records, email) {
        return Ok(false);
    }
    store.save(&records).await.context("Failed to save reply")?;
    info!(email = %record_key(email), "Marked as replied");
    Ok(true)
}
