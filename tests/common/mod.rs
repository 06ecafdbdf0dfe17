// Test doubles shared by the integration tests.
//
// No test talks to a real provider: these implement the Dispatcher and
// Advisor traits in memory and record what they were asked to do.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::time::Instant;

use outreach::advisor::history::InsightEntry;
use outreach::advisor::{Advisor, Variant};
use outreach::dispatch::Dispatcher;
use outreach::metrics::CampaignMetrics;
use outreach::store::models::{OutreachRecord, RecordMap};

/// One call to `Dispatcher::send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub tag: String,
}

/// Dispatcher that records every send and fails for chosen recipients.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<SentMessage>>,
    sent_at: Mutex<Vec<Instant>>,
    failing: HashSet<String>,
    fail_all: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Sends to these recipients fail; everything else succeeds.
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            failing: recipients.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Every attempted send, including failed ones.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// When each send was attempted, on the tokio clock.
    pub fn send_times(&self) -> Vec<Instant> {
        self.sent_at.lock().unwrap().clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.tag).collect()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str, tag: &str) -> Result<()> {
        self.sent_at.lock().unwrap().push(Instant::now());
        self.sent.lock().unwrap().push(SentMessage {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            tag: tag.to_string(),
        });
        if self.fail_all || self.failing.contains(recipient) {
            anyhow::bail!("provider rejected {recipient}");
        }
        Ok(())
    }
}

/// Advisor with canned answers.
pub struct FakeAdvisor {
    pub insights: Option<Value>,
    pub variants: Vec<Variant>,
    /// How many history entries the last `analyze` call was shown
    pub seen_history: Mutex<Option<usize>>,
}

impl FakeAdvisor {
    pub fn answering() -> Self {
        Self {
            insights: Some(json!({
                "top_insight": "Follow-up 1 outperforms the initial email",
                "recommended_changes": ["Shorten the initial subject line"],
            })),
            variants: vec![Variant {
                variant_id: "A".to_string(),
                hypothesis: "Shorter subject lines get more opens".to_string(),
                subject: "{company_name}: quick one".to_string(),
                body: "Hi {first_name}, short version.".to_string(),
            }],
            seen_history: Mutex::new(None),
        }
    }

    pub fn broken() -> Self {
        Self {
            insights: None,
            variants: Vec::new(),
            seen_history: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Advisor for FakeAdvisor {
    fn name(&self) -> &str {
        "fake"
    }

    async fn analyze(&self, _metrics: &CampaignMetrics, recent: &[InsightEntry]) -> Result<Value> {
        *self.seen_history.lock().unwrap() = Some(recent.len());
        match &self.insights {
            Some(insights) => Ok(insights.clone()),
            None => anyhow::bail!("model unavailable"),
        }
    }

    async fn generate_variants(&self, _insights: &Value) -> Result<Vec<Variant>> {
        Ok(self.variants.clone())
    }
}

/// A fixed "now" so elapsed-day arithmetic is exact.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 16, 12, 0, 0).unwrap()
}

/// A record whose initial message went out `days_ago` days before `now`.
pub fn record_sent_days_ago(now: DateTime<Utc>, days_ago: i64) -> OutreachRecord {
    OutreachRecord::new("Glow Med Spa", "Dana", now - Duration::days(days_ago))
}

/// A store map from (email, record) pairs.
pub fn records(entries: Vec<(&str, OutreachRecord)>) -> RecordMap {
    entries
        .into_iter()
        .map(|(email, record)| (email.to_string(), record))
        .collect()
}
