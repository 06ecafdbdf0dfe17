// OpenAI-compatible chat completions implementation.
//
// Both calls ask for a JSON object response and parse the first choice's
// content as JSON. Any compatible endpoint works via OPENAI_BASE_URL.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::history::InsightEntry;
use super::traits::{Advisor, Variant};
use crate::metrics::CampaignMetrics;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const ANALYSIS_SYSTEM: &str =
    "You are an expert cold email strategist focused on B2B SaaS conversions.";
const VARIANTS_SYSTEM: &str = "You are an expert copywriter specializing in cold email A/B testing.";

pub struct OpenAiAdvisor {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiAdvisor {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// One chat completion whose content must be a JSON object.
    async fn complete_json(&self, system: &str, user: &str, temperature: f64) -> Result<Value> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": temperature,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to call chat completions API")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completions API returned {}: {}", status, text);
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completions response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Chat completions response had no content")?;

        debug!(model = %self.model, chars = content.len(), "Received completion");
        serde_json::from_str(&content).context("Model content was not valid JSON")
    }
}

/// User prompt for the analysis call: current numbers plus recent history.
pub fn analysis_prompt(metrics: &CampaignMetrics, recent: &[InsightEntry]) -> Result<String> {
    Ok(format!(
        "Analyze this cold email campaign (3-email sequence: day 0, day 3, day 7).\n\n\
         CURRENT METRICS:\n{}\n\n\
         PREVIOUS INSIGHTS:\n{}\n\n\
         Respond with a JSON object with keys \"insights\" (3-5 strings), \
         \"recommendations\" (strings) and \"ab_test\" (a hypothesis to test next).",
        serde_json::to_string_pretty(metrics)?,
        serde_json::to_string_pretty(recent)?,
    ))
}

/// User prompt for the variants call.
pub fn variants_prompt(insights: &Value) -> Result<String> {
    Ok(format!(
        "Based on these campaign insights, write 2 A/B test variants of the initial email.\n\n\
         INSIGHTS:\n{}\n\n\
         Respond with a JSON object {{\"variants\": [{{\"variant_id\", \"hypothesis\", \
         \"subject\", \"body\"}}]}}. Keep the {{company_name}}, {{first_name}} and \
         %unsubscribe_url% placeholders.",
        serde_json::to_string_pretty(insights)?,
    ))
}

#[async_trait]
impl Advisor for OpenAiAdvisor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn analyze(&self, metrics: &CampaignMetrics, recent: &[InsightEntry]) -> Result<Value> {
        let prompt = analysis_prompt(metrics, recent)?;
        self.complete_json(ANALYSIS_SYSTEM, &prompt, 0.7).await
    }

    async fn generate_variants(&self, insights: &Value) -> Result<Vec<Variant>> {
        let prompt = variants_prompt(insights)?;
        let response = self.complete_json(VARIANTS_SYSTEM, &prompt, 0.8).await?;
        parse_variants(response)
    }
}

/// Pull the variant list out of a `{"variants": [...]}` response.
pub fn parse_variants(response: Value) -> Result<Vec<Variant>> {
    match response.get("variants") {
        Some(list) => serde_json::from_value(list.clone()).context("Malformed variants list"),
        None => Ok(Vec::new()),
    }
}

// --- Chat completions response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
