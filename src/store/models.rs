// Data models — the records and events that flow through the pipeline.
//
// These types are serialized straight into the store files, so field names
// match the on-disk JSON format. Deserialization is deliberately forgiving:
// nulls and missing fields fall back to defaults instead of failing the load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::timestamp;

/// Placeholder first name used when enrichment never found a real one.
pub const DEFAULT_FIRST_NAME: &str = "there";

/// Company name used when a lead arrived without one.
pub const DEFAULT_COMPANY_NAME: &str = "your clinic";

/// Every tracked recipient, keyed by lower-cased email address.
///
/// Ordered so every pass walks recipients in the same sequence.
pub type RecordMap = BTreeMap<String, OutreachRecord>;

/// Normalize an email address into a store key.
pub fn record_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// One step of the outreach cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initial,
    #[serde(rename = "followup_1")]
    Followup1,
    #[serde(rename = "followup_2")]
    Followup2,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Initial, Stage::Followup1, Stage::Followup2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Followup1 => "followup_1",
            Stage::Followup2 => "followup_2",
        }
    }

    /// Provider tag attached to messages sent at this stage.
    pub fn tag(&self) -> &'static str {
        match self {
            Stage::Initial => "initial",
            Stage::Followup1 => "followup-1",
            Stage::Followup2 => "followup-2",
        }
    }

    /// Look up a stage by name. Unknown names return None.
    pub fn from_name(name: &str) -> Option<Self> {
        Stage::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outreach history and engagement flags for a single recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachRecord {
    #[serde(default = "default_company_name", deserialize_with = "company_name_or_default")]
    pub company_name: String,
    #[serde(default = "default_first_name", deserialize_with = "first_name_or_default")]
    pub first_name: String,
    /// None only for damaged records; the scheduler skips those.
    #[serde(default, with = "timestamp::optional")]
    pub initial_sent: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub followup_1_sent: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub followup_2_sent: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub replied: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opened: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clicked: bool,
    /// Template sequence this recipient was enrolled in. None means core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<String>,
}

impl OutreachRecord {
    /// A fresh record for a recipient whose initial message just went out.
    pub fn new(company_name: &str, first_name: &str, initial_sent: DateTime<Utc>) -> Self {
        Self {
            company_name: non_empty_or(company_name, DEFAULT_COMPANY_NAME),
            first_name: non_empty_or(first_name, DEFAULT_FIRST_NAME),
            initial_sent: Some(initial_sent),
            followup_1_sent: None,
            followup_2_sent: None,
            replied: false,
            opened: false,
            clicked: false,
            sequence: None,
        }
    }

    pub fn with_sequence(mut self, sequence: &str) -> Self {
        self.sequence = Some(sequence.to_string());
        self
    }

    /// Replied or clicked recipients never receive another follow-up.
    pub fn is_closed(&self) -> bool {
        self.replied || self.clicked
    }

    /// Whole days elapsed since the initial send, rounded down.
    pub fn days_since_initial(&self, now: DateTime<Utc>) -> Option<i64> {
        self.initial_sent.map(|sent| (now - sent).num_days())
    }

    /// Stamp a follow-up stage. Each stage is stamped at most once and the
    /// initial timestamp is never rewritten; returns false if nothing changed.
    pub fn mark_stage_sent(&mut self, stage: Stage, at: DateTime<Utc>) -> bool {
        let slot = match stage {
            Stage::Initial => return false,
            Stage::Followup1 => &mut self.followup_1_sent,
            Stage::Followup2 => &mut self.followup_2_sent,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(at);
        true
    }

    /// The most recent stage sent, used to attribute opens.
    pub fn latest_stage(&self) -> Stage {
        if self.followup_1_sent.is_none() {
            Stage::Initial
        } else if self.followup_2_sent.is_none() {
            Stage::Followup1
        } else {
            Stage::Followup2
        }
    }
}

/// Kind of engagement signal reported by the email provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Opened,
    Clicked,
    Bounced,
    Complained,
    Unsubscribed,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Opened,
        EventKind::Clicked,
        EventKind::Bounced,
        EventKind::Complained,
        EventKind::Unsubscribed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Opened => "opened",
            EventKind::Clicked => "clicked",
            EventKind::Bounced => "bounced",
            EventKind::Complained => "complained",
            EventKind::Unsubscribed => "unsubscribed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        EventKind::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Store key of the recipient this event belongs to, captured at ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(
        default,
        with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EngagementEvent {
    pub fn new(kind: EventKind, recipient: Option<&str>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            kind,
            recipient: recipient.map(record_key),
            timestamp,
        }
    }
}

fn default_company_name() -> String {
    DEFAULT_COMPANY_NAME.to_string()
}

fn default_first_name() -> String {
    DEFAULT_FIRST_NAME.to_string()
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn company_name_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_company_name))
}

fn first_name_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_first_name))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
