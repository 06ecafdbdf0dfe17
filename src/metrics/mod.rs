// Campaign metrics — summary statistics over records and the event log.
//
// Pure functions only. Rates are percentages rounded to one decimal, 0 when
// there is nothing to divide by, and never above 100 (raw event counts can
// exceed the number of recipients when someone opens twice).

use serde::{Deserialize, Serialize};

use crate::store::models::{EngagementEvent, EventKind, RecordMap, Stage};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignMetrics {
    pub total_sent: usize,
    pub opens: usize,
    pub clicks: usize,
    pub bounces: usize,
    pub complaints: usize,
    pub unsubscribes: usize,
    pub open_rate: f64,
    pub click_rate: f64,
    pub bounce_rate: f64,
    pub followup_1_sent: usize,
    pub followup_2_sent: usize,
    pub initial_opens: usize,
    pub followup_1_opens: usize,
    pub followup_2_opens: usize,
    pub initial_open_rate: f64,
    pub followup_1_open_rate: f64,
    pub followup_2_open_rate: f64,
}

/// `part / whole` as a percentage, rounded to one decimal, clamped to [0, 100].
pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let pct = part as f64 / whole as f64 * 100.0;
    ((pct * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// Aggregate metrics from the tracked records and the event log.
pub fn aggregate(records: &RecordMap, events: &[EngagementEvent]) -> CampaignMetrics {
    let count = |kind: EventKind| events.iter().filter(|e| e.kind == kind).count();

    let total_sent = records.len();
    let opens = count(EventKind::Opened);
    let clicks = count(EventKind::Clicked);
    let bounces = count(EventKind::Bounced);

    let followup_1_sent = records.values().filter(|r| r.followup_1_sent.is_some()).count();
    let followup_2_sent = records.values().filter(|r| r.followup_2_sent.is_some()).count();

    // Attribute each open to the most recent stage sent
    let (mut initial_opens, mut followup_1_opens, mut followup_2_opens) = (0, 0, 0);
    for record in records.values().filter(|r| r.opened) {
        match record.latest_stage() {
            Stage::Initial => initial_opens += 1,
            Stage::Followup1 => followup_1_opens += 1,
            Stage::Followup2 => followup_2_opens += 1,
        }
    }

    CampaignMetrics {
        total_sent,
        opens,
        clicks,
        bounces,
        complaints: count(EventKind::Complained),
        unsubscribes: count(EventKind::Unsubscribed),
        open_rate: rate(opens, total_sent),
        click_rate: rate(clicks, total_sent),
        bounce_rate: rate(bounces, total_sent),
        followup_1_sent,
        followup_2_sent,
        initial_opens,
        followup_1_opens,
        followup_2_opens,
        initial_open_rate: rate(initial_opens, total_sent),
        followup_1_open_rate: rate(followup_1_opens, followup_1_sent),
        followup_2_open_rate: rate(followup_2_opens, followup_2_sent),
    }
}
