// Mailgun messages API implementation.
//
// Posts form-encoded messages to /v3/{domain}/messages with HTTP basic auth
// (user "api"). Open and click tracking are switched on so engagement events
// flow back through the provider's webhooks.
//
// API docs: https://documentation.mailgun.com/docs/mailgun/api-reference/

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::traits::Dispatcher;

pub const DEFAULT_API_BASE: &str = "https://api.mailgun.net/v3";

/// Per-request timeout; a pass never waits longer than this on one send.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tags attached to every message, ahead of the per-stage tag.
pub const CAMPAIGN_TAGS: [&str; 2] = ["lead-agents-studio", "medspa"];

pub struct MailgunDispatcher {
    client: Client,
    api_base: String,
    api_key: String,
    domain: String,
    from: String,
}

impl MailgunDispatcher {
    pub fn new(api_key: &str, domain: &str, from_name: &str, from_address: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("outreach/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.to_string(),
            domain: domain.to_string(),
            from: format!("{from_name} <{from_address}>"),
        })
    }

    /// Point at a different API base (EU region, or a local mock).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Form fields for one message. Tags repeat the `o:tag` key.
    pub fn form_fields(&self, recipient: &str, subject: &str, body: &str, tag: &str) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("from", self.from.clone()),
            ("to", recipient.to_string()),
            ("subject", subject.to_string()),
            ("text", body.to_string()),
            ("o:tracking", "yes".to_string()),
            ("o:tracking-clicks", "yes".to_string()),
            ("o:tracking-opens", "yes".to_string()),
        ];
        for campaign_tag in CAMPAIGN_TAGS {
            fields.push(("o:tag", campaign_tag.to_string()));
        }
        fields.push(("o:tag", tag.to_string()));
        fields
    }
}

#[async_trait]
impl Dispatcher for MailgunDispatcher {
    fn name(&self) -> &str {
        "mailgun"
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str, tag: &str) -> Result<()> {
        let url = format!("{}/{}/messages", self.api_base, self.domain);

        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(&self.api_key))
            .form(&self.form_fields(recipient, subject, body, tag))
            .send()
            .await
            .context("Failed to call Mailgun API")?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mailgun API returned {}: {}", status, body);
        }

        // The id is only logged; a 200 alone means the message was queued.
        if let Ok(accepted) = response.json::<SendResponse>().await {
            debug!(recipient, tag, message_id = ?accepted.id, "Mailgun accepted message");
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}
