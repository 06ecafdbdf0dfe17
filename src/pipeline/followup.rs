// Follow-up pass: decide which tracked recipients are due, send, stamp.
//
// Every record is judged against one `now` shared by the whole pass. Stages
// are checked in priority order and at most one message goes to a recipient
// per pass, so a record first seen on day 10 gets follow-up 1 today and
// follow-up 2 on a later pass, never both at once.
//
// A failed send leaves the stage timestamp unset, which makes the record due
// again next pass. Nothing else about the failure is stored.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::dispatch::rate_limiter::Pacer;
use crate::dispatch::retry::{send_with_retry, RetryPolicy};
use crate::dispatch::Dispatcher;
use crate::store::models::{OutreachRecord, RecordMap, Stage};
use crate::store::RecordStore;
use crate::templates::{self, Sequence};

/// Earliest day after the initial send that follow-up 1 may go out.
pub const MIN_FOLLOWUP_1_DAYS: i64 = 3;

/// Earliest day after the initial send that follow-up 2 may go out.
pub const MIN_FOLLOWUP_2_DAYS: i64 = 7;

/// Days after the initial send at which each follow-up becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub followup_1_days: i64,
    pub followup_2_days: i64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            followup_1_days: MIN_FOLLOWUP_1_DAYS,
            followup_2_days: MIN_FOLLOWUP_2_DAYS,
        }
    }
}

impl Cadence {
    /// A cadence that can only stretch the minimum gaps, never shorten them.
    pub fn checked(followup_1_days: i64, followup_2_days: i64) -> Result<Self> {
        if followup_1_days < MIN_FOLLOWUP_1_DAYS {
            anyhow::bail!(
                "Follow-up 1 can't go out before day {MIN_FOLLOWUP_1_DAYS} (got {followup_1_days})"
            );
        }
        let floor_2 = MIN_FOLLOWUP_2_DAYS.max(followup_1_days);
        if followup_2_days < floor_2 {
            anyhow::bail!(
                "Follow-up 2 can't go out before day {floor_2} (got {followup_2_days})"
            );
        }
        Ok(Self {
            followup_1_days,
            followup_2_days,
        })
    }
}

/// What the scheduler concluded about one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Replied or clicked; excluded from scheduling for good
    Closed,
    /// No usable initial_sent timestamp
    Malformed,
    /// Nothing due right now (too early, or the cadence is finished)
    NotDue { days_since: i64 },
    /// This stage should be sent now
    Due { stage: Stage, days_since: i64 },
}

/// Decide whether `record` is due for a follow-up at `now`.
pub fn evaluate(record: &OutreachRecord, now: DateTime<Utc>, cadence: &Cadence) -> Evaluation {
    if record.is_closed() {
        return Evaluation::Closed;
    }
    let Some(days_since) = record.days_since_initial(now) else {
        return Evaluation::Malformed;
    };

    if days_since >= cadence.followup_1_days && record.followup_1_sent.is_none() {
        Evaluation::Due {
            stage: Stage::Followup1,
            days_since,
        }
    } else if days_since >= cadence.followup_2_days && record.followup_2_sent.is_none() {
        Evaluation::Due {
            stage: Stage::Followup2,
            days_since,
        }
    } else {
        Evaluation::NotDue { days_since }
    }
}

/// A send the pass would make, as reported by a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSend {
    pub email: String,
    pub company_name: String,
    pub stage: Stage,
    pub days_since: i64,
}

/// Every send a pass at `now` would attempt, in pass order. Sends nothing.
pub fn plan(records: &RecordMap, now: DateTime<Utc>, cadence: &Cadence) -> Vec<PlannedSend> {
    records
        .iter()
        .filter_map(|(email, record)| match evaluate(record, now, cadence) {
            Evaluation::Due { stage, days_since } => Some(PlannedSend {
                email: email.clone(),
                company_name: record.company_name.clone(),
                stage,
                days_since,
            }),
            _ => None,
        })
        .collect()
}

/// Tuning for a follow-up pass.
#[derive(Debug, Clone)]
pub struct PassOptions {
    pub cadence: Cadence,
    pub retry: RetryPolicy,
    /// Save the store after every successful send, not just at the end.
    pub checkpoint: bool,
    /// Draw a progress bar on the terminal.
    pub show_progress: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            cadence: Cadence::default(),
            retry: RetryPolicy::default(),
            checkpoint: true,
            show_progress: false,
        }
    }
}

/// Counters for one pass. Failures only ever show up here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub evaluated: usize,
    pub closed: usize,
    pub malformed: usize,
    pub not_due: usize,
    pub followup_1_sent: usize,
    pub followup_2_sent: usize,
    pub failed: usize,
}

impl PassSummary {
    pub fn total_sent(&self) -> usize {
        self.followup_1_sent + self.followup_2_sent
    }
}

/// Run one follow-up pass over the whole store.
///
/// The caller must guarantee no other pass touches `store` concurrently
/// (the binary holds a PassLock). An empty or unreadable store is a no-op
/// and is not written back.
pub async fn run_pass(
    store: &dyn RecordStore,
    dispatcher: &dyn Dispatcher,
    pacer: &Pacer,
    options: &PassOptions,
    now: DateTime<Utc>,
) -> Result<PassSummary> {
    let mut summary = PassSummary::default();
    let mut records = store.load().await;

    if records.is_empty() {
        info!("No tracked recipients, nothing to do");
        return Ok(summary);
    }

    info!(
        tracked = records.len(),
        provider = dispatcher.name(),
        "Starting follow-up pass"
    );

    let keys: Vec<String> = records.keys().cloned().collect();
    let pb = super::progress_bar(keys.len(), "Follow-ups", options.show_progress);

    for email in keys {
        pb.inc(1);
        let Some(record) = records.get(&email) else {
            continue;
        };
        summary.evaluated += 1;

        let (stage, days_since) = match evaluate(record, now, &options.cadence) {
            Evaluation::Closed => {
                summary.closed += 1;
                continue;
            }
            Evaluation::Malformed => {
                warn!(email = %email, "Record has no usable initial_sent, skipping");
                summary.malformed += 1;
                continue;
            }
            Evaluation::NotDue { .. } => {
                summary.not_due += 1;
                continue;
            }
            Evaluation::Due { stage, days_since } => (stage, days_since),
        };

        let sequence = Sequence::for_record(record.sequence.as_deref());
        let message = templates::render(
            sequence.template(stage),
            &record.first_name,
            &record.company_name,
        );
        if !message.is_complete() {
            summary.failed += 1;
            warn!(
                email = %email,
                stage = %stage,
                placeholders = ?message.missing,
                "Message has unfilled placeholders, not sending"
            );
            continue;
        }

        info!(
            email = %email,
            company = %record.company_name,
            stage = %stage,
            day = days_since,
            "Sending follow-up"
        );

        match send_with_retry(
            dispatcher,
            pacer,
            &options.retry,
            &email,
            &message.subject,
            &message.body,
            stage.tag(),
        )
        .await
        {
            Ok(attempts) => {
                if let Some(record) = records.get_mut(&email) {
                    record.mark_stage_sent(stage, now);
                }
                match stage {
                    Stage::Followup1 => summary.followup_1_sent += 1,
                    Stage::Followup2 => summary.followup_2_sent += 1,
                    Stage::Initial => {}
                }
                info!(email = %email, stage = %stage, attempts, "Sent");

                if options.checkpoint {
                    if let Err(e) = store.save(&records).await {
                        warn!(error = %e, "Checkpoint save failed, will retry at end of pass");
                    }
                }
            }
            Err(e) => {
                summary.failed += 1;
                warn!(
                    email = %email,
                    stage = %stage,
                    error = %e,
                    "Send failed, will retry next pass"
                );
            }
        }
    }
    pb.finish_and_clear();

    store
        .save(&records)
        .await
        .with_context(|| format!("Failed to save records to {}", store.location()))?;

    info!(
        followup_1 = summary.followup_1_sent,
        followup_2 = summary.followup_2_sent,
        failed = summary.failed,
        "Follow-up pass complete"
    );
    Ok(summary)
}
