// System status display — record counts, stage breakdown, what's due next.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::pipeline::followup::{self, Cadence};
use crate::store::models::Stage;
use crate::store::RecordStore;

/// Display system status to the terminal.
pub async fn show(
    store: &dyn RecordStore,
    data_dir: &Path,
    cadence: &Cadence,
    now: DateTime<Utc>,
) -> Result<()> {
    println!("Data directory: {}", data_dir.display());
    println!("Record store: {}", store.location());

    let records = store.load().await;
    if records.is_empty() {
        println!("Tracked recipients: none yet");
        println!("  Run `outreach send <leads.json>` to start a campaign");
        return Ok(());
    }

    let at_stage = |stage: Stage| {
        records
            .values()
            .filter(|r| r.latest_stage() == stage)
            .count()
    };
    println!(
        "Tracked recipients: {} (initial only: {}, follow-up 1: {}, follow-up 2: {})",
        records.len(),
        at_stage(Stage::Initial),
        at_stage(Stage::Followup1),
        at_stage(Stage::Followup2),
    );

    let replied = records.values().filter(|r| r.replied).count();
    let clicked = records.values().filter(|r| r.clicked).count();
    let opened = records.values().filter(|r| r.opened).count();
    println!("Engagement: {opened} opened, {clicked} clicked, {replied} replied");

    let events = store.load_events().await;
    println!("Event log: {} events", events.len());

    let due = followup::plan(&records, now, cadence);
    if due.is_empty() {
        println!("Due now: nothing");
    } else {
        let stage_1 = due.iter().filter(|d| d.stage == Stage::Followup1).count();
        println!(
            "Due now: {} follow-ups ({} stage 1, {} stage 2)",
            due.len(),
            stage_1,
            due.len() - stage_1
        );
        println!("  Run `outreach followup` to send them");
    }

    if let Some(last) = records.values().filter_map(|r| r.initial_sent).max() {
        println!("Last initial send: {}", last.format("%Y-%m-%d %H:%M UTC"));
    }

    Ok(())
}
