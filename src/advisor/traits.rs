// Advisor trait — the seam in front of the language model.
//
// The advisor reads campaign metrics and recent history and returns free-form
// JSON insights, then turns insights into A/B copy variants. Its output is
// advisory only: nothing in the pipeline acts on it automatically.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::history::InsightEntry;
use crate::metrics::CampaignMetrics;

/// One candidate rewrite of the initial email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
    pub variant_id: String,
    pub hypothesis: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Advisor: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Analyze current metrics against recent history.
    async fn analyze(&self, metrics: &CampaignMetrics, recent: &[InsightEntry]) -> Result<Value>;

    /// Propose copy variants that test the insights' hypothesis.
    async fn generate_variants(&self, insights: &Value) -> Result<Vec<Variant>>;
}
