// Campaign advisor — asks a language model what to change.
//
// Runs after metrics are computed: the advisor sees current numbers plus the
// last few analyses, its insights are appended to the history file, and a
// second call proposes A/B variants of the initial email. Advisor failures
// are logged and reported as "no insights"; they never fail the command.

pub mod history;
pub mod openai;
pub mod traits;

pub use traits::{Advisor, Variant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::metrics::{self, CampaignMetrics};
use crate::store::RecordStore;
use history::{HistoryFiles, InsightEntry};

/// How many past analyses the advisor sees.
pub const HISTORY_CONTEXT: usize = 3;

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub metrics: CampaignMetrics,
    /// None when the advisor failed or returned nothing
    pub insights: Option<Value>,
    pub variants: Vec<Variant>,
}

fn is_empty_insights(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Compute metrics, ask the advisor, and persist what it says.
///
/// Returns None when nothing has been sent yet.
pub async fn run_analysis(
    store: &dyn RecordStore,
    advisor: &dyn Advisor,
    files: &HistoryFiles,
    now: DateTime<Utc>,
) -> Result<Option<AnalysisOutcome>> {
    let records = store.load().await;
    if records.is_empty() {
        return Ok(None);
    }
    let events = store.load_events().await;
    let metrics = metrics::aggregate(&records, &events);
    info!(
        total_sent = metrics.total_sent,
        open_rate = metrics.open_rate,
        "Computed campaign metrics"
    );

    let mut outcome = AnalysisOutcome {
        metrics: metrics.clone(),
        insights: None,
        variants: Vec::new(),
    };

    let mut history = files.load_history().await;
    let insights = match advisor
        .analyze(&metrics, history.recent(HISTORY_CONTEXT))
        .await
    {
        Ok(insights) if !is_empty_insights(&insights) => insights,
        Ok(_) => {
            warn!(advisor = advisor.name(), "Advisor returned no insights");
            return Ok(Some(outcome));
        }
        Err(e) => {
            warn!(advisor = advisor.name(), error = %e, "Advisor analysis failed");
            return Ok(Some(outcome));
        }
    };

    history.history.push(InsightEntry {
        timestamp: Some(now),
        metrics,
        insights: insights.clone(),
    });
    files.save_history(&history).await?;

    match advisor.generate_variants(&insights).await {
        Ok(variants) if !variants.is_empty() => {
            files.save_variants(&variants).await?;
            info!(count = variants.len(), "Saved A/B variants");
            outcome.variants = variants;
        }
        Ok(_) => warn!(advisor = advisor.name(), "Advisor proposed no variants"),
        Err(e) => warn!(advisor = advisor.name(), error = %e, "Variant generation failed"),
    }

    outcome.insights = Some(insights);
    Ok(Some(outcome))
}
