// Unit tests for metric aggregation.
//
// Rate rounding and clamping, zero denominators, and per-stage open
// attribution by the most recent stage sent.

mod common;

use chrono::Duration;

use common::{fixed_now, record_sent_days_ago, records};
use outreach::metrics::{aggregate, rate};
use outreach::store::models::{EngagementEvent, EventKind, RecordMap};

fn events(kinds: &[(EventKind, usize)]) -> Vec<EngagementEvent> {
    kinds
        .iter()
        .flat_map(|(kind, n)| (0..*n).map(move |_| EngagementEvent::new(*kind, None, None)))
        .collect()
}

// ============================================================
// rate
// ============================================================

#[test]
fn rate_rounds_to_one_decimal() {
    assert_eq!(rate(1, 3), 33.3);
    assert_eq!(rate(2, 3), 66.7);
    assert_eq!(rate(1, 8), 12.5);
}

#[test]
fn rate_zero_denominator_is_zero() {
    assert_eq!(rate(5, 0), 0.0);
    assert_eq!(rate(0, 0), 0.0);
}

#[test]
fn rate_clamps_at_one_hundred() {
    assert_eq!(rate(7, 2), 100.0);
}

// ============================================================
// aggregate
// ============================================================

#[test]
fn empty_inputs_give_all_zero_metrics() {
    let metrics = aggregate(&RecordMap::new(), &[]);
    assert_eq!(metrics.total_sent, 0);
    assert_eq!(metrics.open_rate, 0.0);
    assert_eq!(metrics.followup_1_open_rate, 0.0);
}

#[test]
fn events_without_records_still_count_but_rates_stay_zero() {
    let metrics = aggregate(&RecordMap::new(), &events(&[(EventKind::Opened, 4)]));
    assert_eq!(metrics.opens, 4);
    assert_eq!(metrics.open_rate, 0.0);
}

#[test]
fn counts_each_event_type() {
    let now = fixed_now();
    let map = records(vec![
        ("a@x.com", record_sent_days_ago(now, 1)),
        ("b@x.com", record_sent_days_ago(now, 1)),
        ("c@x.com", record_sent_days_ago(now, 1)),
        ("d@x.com", record_sent_days_ago(now, 1)),
    ]);
    let log = events(&[
        (EventKind::Opened, 2),
        (EventKind::Clicked, 1),
        (EventKind::Bounced, 1),
        (EventKind::Complained, 1),
        (EventKind::Unsubscribed, 2),
    ]);

    let metrics = aggregate(&map, &log);

    assert_eq!(metrics.total_sent, 4);
    assert_eq!(metrics.opens, 2);
    assert_eq!(metrics.clicks, 1);
    assert_eq!(metrics.bounces, 1);
    assert_eq!(metrics.complaints, 1);
    assert_eq!(metrics.unsubscribes, 2);
    assert_eq!(metrics.open_rate, 50.0);
    assert_eq!(metrics.click_rate, 25.0);
    assert_eq!(metrics.bounce_rate, 25.0);
}

#[test]
fn repeat_opens_cannot_push_rate_over_one_hundred() {
    let now = fixed_now();
    let map = records(vec![("a@x.com", record_sent_days_ago(now, 1))]);
    let metrics = aggregate(&map, &events(&[(EventKind::Opened, 5)]));
    assert_eq!(metrics.open_rate, 100.0);
}

#[test]
fn opens_are_attributed_to_latest_stage() {
    let now = fixed_now();

    let mut initial_only = record_sent_days_ago(now, 1);
    initial_only.opened = true;

    let mut after_first = record_sent_days_ago(now, 5);
    after_first.followup_1_sent = Some(now - Duration::days(2));
    after_first.opened = true;

    let mut after_second = record_sent_days_ago(now, 9);
    after_second.followup_1_sent = Some(now - Duration::days(6));
    after_second.followup_2_sent = Some(now - Duration::days(2));
    after_second.opened = true;

    let mut unopened_second = record_sent_days_ago(now, 9);
    unopened_second.followup_1_sent = Some(now - Duration::days(6));
    unopened_second.followup_2_sent = Some(now - Duration::days(2));

    let map = records(vec![
        ("a@x.com", initial_only),
        ("b@x.com", after_first),
        ("c@x.com", after_second),
        ("d@x.com", unopened_second),
    ]);

    let metrics = aggregate(&map, &[]);

    assert_eq!(metrics.followup_1_sent, 3);
    assert_eq!(metrics.followup_2_sent, 2);
    assert_eq!(metrics.initial_opens, 1);
    assert_eq!(metrics.followup_1_opens, 1);
    assert_eq!(metrics.followup_2_opens, 1);
    assert_eq!(metrics.initial_open_rate, 25.0);
    assert_eq!(metrics.followup_1_open_rate, 33.3);
    assert_eq!(metrics.followup_2_open_rate, 50.0);
}

#[test]
fn all_rates_stay_in_bounds() {
    let now = fixed_now();
    let mut opened = record_sent_days_ago(now, 9);
    opened.opened = true;
    opened.clicked = true;
    let map = records(vec![("a@x.com", opened)]);
    let log = events(&[
        (EventKind::Opened, 9),
        (EventKind::Clicked, 9),
        (EventKind::Bounced, 9),
    ]);

    let m = aggregate(&map, &log);
    for value in [
        m.open_rate,
        m.click_rate,
        m.bounce_rate,
        m.initial_open_rate,
        m.followup_1_open_rate,
        m.followup_2_open_rate,
    ] {
        assert!((0.0..=100.0).contains(&value), "rate {value} out of range");
    }
}

#[test]
fn metrics_serialize_with_stable_field_names() {
    let metrics = aggregate(&RecordMap::new(), &[]);
    let json = serde_json::to_value(&metrics).unwrap();
    for field in [
        "total_sent",
        "open_rate",
        "followup_1_sent",
        "initial_open_rate",
        "followup_2_open_rate",
    ] {
        assert!(json.get(field).is_some(), "missing {field}");
    }
}
