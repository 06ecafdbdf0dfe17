// Initial-send pipeline: enroll new leads.
//
// Reads a leads file, drops anything already tracked or unusable, caps the
// batch, and sends the first message of the chosen sequence to each lead.
// A record is created only after the provider accepts the message, and the
// store is saved right away so a crash can't cause a second initial send.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::dispatch::rate_limiter::Pacer;
use crate::dispatch::retry::{send_with_retry, RetryPolicy};
use crate::dispatch::Dispatcher;
use crate::store::models::{
    record_key, OutreachRecord, Stage, DEFAULT_COMPANY_NAME, DEFAULT_FIRST_NAME,
};
use crate::store::RecordStore;
use crate::templates::{self, Sequence};

/// A business contact ready for outreach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub email: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    /// Only the high_reviews sequence uses this.
    #[serde(default)]
    pub google_review_count: Option<u32>,
}

impl Lead {
    pub fn company_name(&self) -> &str {
        self.company_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_COMPANY_NAME)
    }

    pub fn first_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_FIRST_NAME)
    }

    /// Placeholder values for rendering this lead's initial message.
    pub fn template_values(&self) -> Vec<(&'static str, String)> {
        let mut values = vec![
            ("first_name", self.first_name().to_string()),
            ("company_name", self.company_name().to_string()),
        ];
        if let Some(count) = self.google_review_count {
            values.push(("google_review_count", count.to_string()));
        }
        values
    }
}

/// Read a JSON array of leads.
pub fn load_leads(path: &Path) -> Result<Vec<Lead>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read leads file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Leads file {} is not a JSON array of leads", path.display()))
}

/// Cheap shape check; the provider does the real validation.
pub fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !email.contains(' ')
        }
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct CampaignOptions {
    pub sequence: Sequence,
    /// Most initial messages to send in one run.
    pub max_per_run: usize,
    pub retry: RetryPolicy,
    pub show_progress: bool,
}

impl Default for CampaignOptions {
    fn default() -> Self {
        Self {
            sequence: Sequence::Core,
            max_per_run: 20,
            retry: RetryPolicy::default(),
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignSummary {
    pub leads: usize,
    pub invalid: usize,
    pub already_tracked: usize,
    pub new_leads: usize,
    pub selected: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Send the initial message to every new lead, up to the per-run cap.
pub async fn run(
    store: &dyn RecordStore,
    dispatcher: &dyn Dispatcher,
    pacer: &Pacer,
    leads: &[Lead],
    options: &CampaignOptions,
    now: DateTime<Utc>,
) -> Result<CampaignSummary> {
    // An unreadable store is not an empty one; saving over it erases history
    let mut records = store.load_checked().await.with_context(|| {
        format!(
            "Refusing to send: record store {} can't be read. Fix or move it aside first",
            store.location()
        )
    })?;
    let mut summary = CampaignSummary {
        leads: leads.len(),
        ..CampaignSummary::default()
    };

    // Filter: valid, not tracked, first occurrence only
    let mut seen: HashSet<String> = HashSet::new();
    let mut fresh: Vec<&Lead> = Vec::new();
    for lead in leads {
        let key = record_key(&lead.email);
        if !looks_like_email(&key) {
            summary.invalid += 1;
            continue;
        }
        if records.contains_key(&key) {
            summary.already_tracked += 1;
            continue;
        }
        if seen.insert(key) {
            fresh.push(lead);
        }
    }
    summary.new_leads = fresh.len();

    let selected: Vec<&Lead> = fresh.into_iter().take(options.max_per_run).collect();
    summary.selected = selected.len();

    info!(
        leads = summary.leads,
        new = summary.new_leads,
        selected = summary.selected,
        sequence = %options.sequence,
        "Starting initial sends"
    );

    let template = options.sequence.template(Stage::Initial);
    let pb = super::progress_bar(selected.len(), "Initial", options.show_progress);

    for lead in selected {
        pb.inc(1);
        let key = record_key(&lead.email);
        let message = templates::render_with(template, &lead.template_values());
        if !message.is_complete() {
            summary.failed += 1;
            warn!(
                email = %key,
                placeholders = ?message.missing,
                "Lead is missing fields this sequence needs, not sending"
            );
            continue;
        }

        match send_with_retry(
            dispatcher,
            pacer,
            &options.retry,
            &key,
            &message.subject,
            &message.body,
            Stage::Initial.tag(),
        )
        .await
        {
            Ok(_) => {
                let record = OutreachRecord::new(lead.company_name(), lead.first_name(), now)
                    .with_sequence(options.sequence.as_str());
                records.insert(key.clone(), record);
                summary.sent += 1;
                info!(email = %key, company = lead.company_name(), "Initial message sent");

                store
                    .save(&records)
                    .await
                    .with_context(|| format!("Failed to record initial send to {key}"))?;
            }
            Err(e) => {
                summary.failed += 1;
                warn!(email = %key, error = %e, "Initial send failed");
            }
        }
    }
    pb.finish_and_clear();

    Ok(summary)
}
