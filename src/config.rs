use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::advisor::openai;
use crate::dispatch::retry::RetryPolicy;
use crate::pipeline::followup::{Cadence, MIN_FOLLOWUP_1_DAYS, MIN_FOLLOWUP_2_DAYS};
use crate::store::StoreBackend;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub mailgun_api_key: String,
    pub mailgun_domain: String,
    pub from_address: String,
    pub from_name: String,
    pub openai_api_key: String,
    pub openai_model: String,
    /// Any OpenAI-compatible endpoint (defaults to api.openai.com)
    pub openai_base_url: String,
    /// Where records, events, insights and the lock file live
    pub data_dir: PathBuf,
    pub store_backend: StoreBackend,
    /// Minimum gap between consecutive sends
    pub pacing: Duration,
    /// Cap on initial sends per `send` run
    pub max_per_run: usize,
    pub cadence: Cadence,
    pub retry: RetryPolicy,
}

/// Default data directory: the platform's local data dir plus `outreach`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("outreach")
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let store_backend = match get("OUTREACH_STORE").as_deref() {
            Some("sqlite") => StoreBackend::Sqlite,
            Some("json") | None => StoreBackend::Json,
            Some(other) => anyhow::bail!(
                "OUTREACH_STORE={other:?} is not a known backend (expected \"json\" or \"sqlite\")"
            ),
        };

        let pacing_secs: f64 = parse_var(&get, "OUTREACH_PACING_SECS", 5.0)?;
        if !pacing_secs.is_finite() || pacing_secs < 0.0 {
            anyhow::bail!("OUTREACH_PACING_SECS must be a non-negative number of seconds");
        }

        let cadence = Cadence::checked(
            parse_var(&get, "OUTREACH_FOLLOWUP_1_DAYS", MIN_FOLLOWUP_1_DAYS)?,
            parse_var(&get, "OUTREACH_FOLLOWUP_2_DAYS", MIN_FOLLOWUP_2_DAYS)?,
        )
        .context("Invalid OUTREACH_FOLLOWUP_1_DAYS / OUTREACH_FOLLOWUP_2_DAYS")?;

        let retry = RetryPolicy::new(
            parse_var(&get, "OUTREACH_MAX_ATTEMPTS", 1)?,
            Duration::from_secs(parse_var(&get, "OUTREACH_RETRY_BACKOFF_SECS", 30)?),
        );

        Ok(Self {
            mailgun_api_key: or("MAILGUN_API_KEY", ""),
            mailgun_domain: or("MAILGUN_DOMAIN", "leadagentsstudio.com"),
            from_address: or("EMAIL_FROM_ADDRESS", "support@leadagentsstudio.com"),
            from_name: or("EMAIL_FROM_NAME", "Lead Agents Studio"),
            openai_api_key: or("OPENAI_API_KEY", ""),
            openai_model: or("OPENAI_MODEL", openai::DEFAULT_MODEL),
            openai_base_url: or("OPENAI_BASE_URL", openai::DEFAULT_BASE_URL),
            data_dir: get("OUTREACH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            store_backend,
            pacing: Duration::from_secs_f64(pacing_secs),
            max_per_run: parse_var(&get, "OUTREACH_MAX_PER_RUN", 20)?,
            cadence,
            retry,
        })
    }

    /// Check that Mailgun credentials are configured.
    /// Call this before any operation that sends email.
    pub fn require_mailgun(&self) -> Result<()> {
        if self.mailgun_api_key.is_empty() {
            anyhow::bail!(
                "MAILGUN_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Check that the language model API key is configured.
    /// Call this before `analyze`.
    pub fn require_openai(&self) -> Result<()> {
        if self.openai_api_key.is_empty() {
            anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}

fn parse_var<T, G>(get: &G, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{name}={raw:?} is not valid: {e}")),
        None => Ok(default),
    }
}
