// Insight history and variant files.
//
// Both live next to the record store as plain JSON and are read fail-soft,
// same as the store itself.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::traits::Variant;
use crate::metrics::CampaignMetrics;
use crate::store::json::{read_document, write_atomic};
use crate::store::timestamp;

pub const INSIGHTS_FILE: &str = "llm_insights.json";
pub const VARIANTS_FILE: &str = "email_variants.json";

/// One past analysis: what the numbers were and what the advisor said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightEntry {
    #[serde(default, with = "timestamp::optional")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metrics: CampaignMetrics,
    #[serde(default)]
    pub insights: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsHistory {
    #[serde(default)]
    pub history: Vec<InsightEntry>,
}

impl InsightsHistory {
    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[InsightEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn latest(&self) -> Option<&InsightEntry> {
        self.history.last()
    }
}

pub struct HistoryFiles {
    insights_path: PathBuf,
    variants_path: PathBuf,
}

impl HistoryFiles {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            insights_path: data_dir.join(INSIGHTS_FILE),
            variants_path: data_dir.join(VARIANTS_FILE),
        }
    }

    pub async fn load_history(&self) -> InsightsHistory {
        read_document(&self.insights_path)
            .await
            .and_then(|doc| serde_json::from_value(doc).ok())
            .unwrap_or_default()
    }

    pub async fn save_history(&self, history: &InsightsHistory) -> Result<()> {
        let json = serde_json::to_string_pretty(history)?;
        write_atomic(&self.insights_path, json.as_bytes()).await
    }

    pub async fn load_variants(&self) -> Vec<Variant> {
        read_document(&self.variants_path)
            .await
            .and_then(|doc| serde_json::from_value(doc).ok())
            .unwrap_or_default()
    }

    pub async fn save_variants(&self, variants: &[Variant]) -> Result<()> {
        let json = serde_json::to_string_pretty(variants)?;
        write_atomic(&self.variants_path, json.as_bytes()).await
    }
}
