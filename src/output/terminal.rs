// Colored terminal output for passes, metrics and advisor results.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here after the library has done the work.

use colored::Colorize;
use serde_json::Value;

use crate::advisor::{AnalysisOutcome, Variant};
use crate::events::IngestSummary;
use crate::metrics::CampaignMetrics;
use crate::pipeline::followup::{PassSummary, PlannedSend};
use crate::pipeline::initial::CampaignSummary;
use crate::store::models::Stage;

/// Display the result of a follow-up pass.
pub fn display_pass_summary(summary: &PassSummary) {
    println!("\n{}", "=== Follow-up Pass ===".bold());
    println!("  Recipients evaluated: {}", summary.evaluated);
    println!("  Follow-up 1 sent:     {}", summary.followup_1_sent);
    println!("  Follow-up 2 sent:     {}", summary.followup_2_sent);
    println!("  Not due yet:          {}", summary.not_due);
    println!("  Closed (replied/clicked): {}", summary.closed);
    if summary.failed > 0 {
        println!(
            "  {} {} sends failed (will retry next pass)",
            "!".yellow().bold(),
            summary.failed
        );
    }
    if summary.malformed > 0 {
        println!(
            "  {} {} records skipped (no usable initial_sent)",
            "!".yellow().bold(),
            summary.malformed
        );
    }
}

/// Display what a pass would send, without sending.
pub fn display_plan(plan: &[PlannedSend]) {
    if plan.is_empty() {
        println!("No follow-ups are due.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Due Follow-ups ({}) ===", plan.len()).bold()
    );
    println!();
    println!(
        "  {:<40} {:<28} {:<11} {:>4}",
        "Recipient".dimmed(),
        "Company".dimmed(),
        "Stage".dimmed(),
        "Day".dimmed(),
    );
    println!("  {}", "-".repeat(86).dimmed());

    for send in plan {
        println!(
            "  {:<40} {:<28} {:<11} {:>4}",
            super::truncate_chars(&send.email, 37),
            super::truncate_chars(&send.company_name, 25),
            colorize_stage(send.stage),
            send.days_since,
        );
    }
}

/// Display the result of an initial-send run.
pub fn display_campaign_summary(summary: &CampaignSummary) {
    println!("\n{}", "=== Initial Sends ===".bold());
    println!("  Leads in file:   {}", summary.leads);
    println!("  Already tracked: {}", summary.already_tracked);
    println!("  Invalid emails:  {}", summary.invalid);
    println!("  New leads:       {}", summary.new_leads);
    println!("  Selected:        {}", summary.selected);
    println!("  Sent:            {}", summary.sent.to_string().green());
    if summary.failed > 0 {
        println!("  Failed:          {}", summary.failed.to_string().red());
    }
}

/// Display the result of ingesting provider events.
pub fn display_ingest_summary(summary: &IngestSummary) {
    println!("Events received: {}", summary.received);
    println!("Flags raised:    {}", summary.flags_set);
    if summary.unmatched > 0 {
        println!(
            "{} {} events matched no tracked recipient",
            "Warning:".yellow(),
            summary.unmatched
        );
    }
}

/// Display campaign metrics.
pub fn display_metrics(metrics: &CampaignMetrics) {
    println!("\n{}", "=== Campaign Metrics ===".bold());
    println!("  Tracked recipients: {}", metrics.total_sent);
    println!();
    println!("  Open rate:   {:>5.1}%  ({} opens)", metrics.open_rate, metrics.opens);
    println!("  Click rate:  {:>5.1}%  ({} clicks)", metrics.click_rate, metrics.clicks);
    println!(
        "  Bounce rate: {}  ({} bounces)",
        colorize_bounce_rate(metrics.bounce_rate),
        metrics.bounces
    );
    println!(
        "  Complaints: {}  Unsubscribes: {}",
        metrics.complaints, metrics.unsubscribes
    );

    println!("\n  {}", "Opens by stage:".bold());
    println!(
        "    {:<11} {:>5.1}%  ({} of {})",
        colorize_stage(Stage::Initial),
        metrics.initial_open_rate,
        metrics.initial_opens,
        metrics.total_sent
    );
    println!(
        "    {:<11} {:>5.1}%  ({} of {})",
        colorize_stage(Stage::Followup1),
        metrics.followup_1_open_rate,
        metrics.followup_1_opens,
        metrics.followup_1_sent
    );
    println!(
        "    {:<11} {:>5.1}%  ({} of {})",
        colorize_stage(Stage::Followup2),
        metrics.followup_2_open_rate,
        metrics.followup_2_opens,
        metrics.followup_2_sent
    );
}

/// Display advisor insights and variants.
pub fn display_analysis(outcome: &AnalysisOutcome) {
    display_metrics(&outcome.metrics);

    match &outcome.insights {
        Some(insights) => {
            println!("\n{}", "=== Advisor Insights ===".bold());
            print_json_outline(insights, 1);
        }
        None => {
            println!(
                "\n{}",
                "Advisor returned no insights (see logs for details).".yellow()
            );
            return;
        }
    }

    display_variants(&outcome.variants);
}

/// Display proposed A/B variants.
pub fn display_variants(variants: &[Variant]) {
    if variants.is_empty() {
        println!("\n{}", "No A/B variants proposed.".dimmed());
        return;
    }
    println!(
        "\n{}",
        format!("=== A/B Variants ({}) ===", variants.len()).bold()
    );
    for variant in variants {
        println!("\n  {}", variant.variant_id.bold());
        println!("    Hypothesis: {}", variant.hypothesis);
        println!("    Subject:    {}", variant.subject);
        println!(
            "    Body:       {}",
            super::truncate_chars(&variant.body.replace('\n', " "), 100).dimmed()
        );
    }
}

/// Print a JSON value as an indented outline.
fn print_json_outline(value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                match inner {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{indent}{}:", key.bold());
                        print_json_outline(inner, depth + 1);
                    }
                    scalar => println!("{indent}{}: {}", key.bold(), scalar_text(scalar)),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => print_json_outline(item, depth + 1),
                    scalar => println!("{indent}- {}", scalar_text(scalar)),
                }
            }
        }
        scalar => println!("{indent}{}", scalar_text(scalar)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Colorize a stage name.
fn colorize_stage(stage: Stage) -> colored::ColoredString {
    match stage {
        Stage::Initial => stage.as_str().normal(),
        Stage::Followup1 => stage.as_str().cyan(),
        Stage::Followup2 => stage.as_str().magenta(),
    }
}

/// Bounce rates above a few percent hurt sender reputation.
fn colorize_bounce_rate(rate: f64) -> colored::ColoredString {
    let text = format!("{rate:>5.1}%");
    if rate >= 5.0 {
        text.red().bold()
    } else if rate >= 2.0 {
        text.yellow()
    } else {
        text.green()
    }
}
