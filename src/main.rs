use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use outreach::config::Config;
use outreach::dispatch::mailgun::MailgunDispatcher;
use outreach::dispatch::rate_limiter::Pacer;
use outreach::pipeline::followup::{self, PassOptions};
use outreach::pipeline::initial::{self, CampaignOptions};
use outreach::store::lock::PassLock;
use outreach::store::RecordStore;
use outreach::templates::Sequence;

/// Outreach: cold-email pipeline with scheduled follow-ups.
///
/// Sends templated initial emails to new leads, follows up with
/// non-responders on a fixed cadence, and reports engagement.
#[derive(Parser)]
#[command(name = "outreach", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and an empty record store
    Init,

    /// Send the initial email to new leads from a JSON file
    Send {
        /// JSON array of {email, company_name?, first_name?}
        leads: PathBuf,

        /// Template sequence (core, running_ads, hiring, high_reviews)
        #[arg(long, default_value = "core")]
        sequence: String,

        /// Max emails to send this run (default: OUTREACH_MAX_PER_RUN)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Send any follow-ups that are due
    Followup {
        /// Show what would be sent without sending anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply provider events (Mailgun webhook payloads) from a JSON file
    Ingest {
        /// File holding one event or an array of events
        path: PathBuf,
    },

    /// Record that a recipient replied (stops their follow-ups)
    MarkReplied {
        email: String,
    },

    /// Show campaign metrics
    Metrics {
        /// Print raw JSON instead of the formatted report
        #[arg(long)]
        json: bool,
    },

    /// Ask the language model for copy and cadence suggestions
    Analyze,

    /// Show system status (tracked recipients, what's due)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("outreach=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            let _lock = PassLock::acquire(&config.data_dir)?;
            let store = open_store(&config)?;
            // Write back whatever is there so the backing file exists, but
            // never over a store we couldn't read
            let records = store.load_checked().await.with_context(|| {
                format!("Record store {} can't be read; leaving it untouched", store.location())
            })?;
            store.save(&records).await?;
            println!("Data directory: {}", config.data_dir.display());
            println!("Record store:   {}", store.location());
            println!("Tracked recipients: {}", records.len());
            println!("\nOutreach is ready. Next step: set up your .env file");
            println!("  (see .env.example for required variables)");
        }

        Commands::Send {
            leads,
            sequence,
            max,
        } => {
            config.require_mailgun()?;
            let _lock = PassLock::acquire(&config.data_dir)?;
            let store = open_store(&config)?;
            let dispatcher = create_dispatcher(&config)?;

            let leads = initial::load_leads(&leads)?;
            let sequence_kind = Sequence::from_name(&sequence);
            if sequence_kind.as_str() != sequence {
                println!(
                    "{} unknown sequence {:?}, using {}",
                    "Warning:".yellow(),
                    sequence,
                    sequence_kind
                );
            }

            let options = CampaignOptions {
                sequence: sequence_kind,
                max_per_run: max.unwrap_or(config.max_per_run),
                retry: config.retry,
                show_progress: true,
            };

            println!(
                "Sending initial emails ({} leads, sequence {})...",
                leads.len(),
                sequence_kind
            );
            let pacer = Pacer::from_config(&config);
            let summary = initial::run(
                store.as_ref(),
                &dispatcher,
                &pacer,
                &leads,
                &options,
                Utc::now(),
            )
            .await?;

            outreach::output::terminal::display_campaign_summary(&summary);
        }

        Commands::Followup { dry_run } => {
            let now = Utc::now();
            if dry_run {
                let store = open_store(&config)?;
                let records = store.load().await;
                let plan = followup::plan(&records, now, &config.cadence);
                outreach::output::terminal::display_plan(&plan);
                return Ok(());
            }

            config.require_mailgun()?;
            let _lock = PassLock::acquire(&config.data_dir)?;
            let store = open_store(&config)?;
            let dispatcher = create_dispatcher(&config)?;

            println!("Running follow-up pass...");
            let options = PassOptions {
                cadence: config.cadence,
                retry: config.retry,
                checkpoint: true,
                show_progress: true,
            };
            let pacer = Pacer::from_config(&config);
            let summary =
                followup::run_pass(store.as_ref(), &dispatcher, &pacer, &options, now).await?;

            outreach::output::terminal::display_pass_summary(&summary);
        }

        Commands::Ingest { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let document: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            let events = outreach::events::parse_payload(&document);

            let _lock = PassLock::acquire(&config.data_dir)?;
            let store = open_store(&config)?;
            let summary = outreach::events::ingest(store.as_ref(), &events).await?;

            outreach::output::terminal::display_ingest_summary(&summary);
        }

        Commands::MarkReplied { email } => {
            let _lock = PassLock::acquire(&config.data_dir)?;
            let store = open_store(&config)?;
            if outreach::events::record_reply(store.as_ref(), &email).await? {
                println!("Marked {} as replied. No further follow-ups will be sent.", email);
            } else {
                anyhow::bail!("{email} is not a tracked recipient");
            }
        }

        Commands::Metrics { json } => {
            let store = open_store(&config)?;
            let records = store.load().await;
            let events = store.load_events().await;
            let metrics = outreach::metrics::aggregate(&records, &events);

            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else if metrics.total_sent == 0 {
                println!("No data yet. Run `outreach send` first.");
            } else {
                outreach::output::terminal::display_metrics(&metrics);
            }
        }

        Commands::Analyze => {
            config.require_openai()?;
            let _lock = PassLock::acquire(&config.data_dir)?;
            let store = open_store(&config)?;
            let advisor = outreach::advisor::openai::OpenAiAdvisor::new(
                &config.openai_api_key,
                &config.openai_base_url,
                &config.openai_model,
            )?;
            let files = outreach::advisor::history::HistoryFiles::new(&config.data_dir);

            println!("Running campaign analysis...");
            match outreach::advisor::run_analysis(store.as_ref(), &advisor, &files, Utc::now())
                .await?
            {
                Some(outcome) => outreach::output::terminal::display_analysis(&outcome),
                None => println!("No data yet. Run `outreach send` first."),
            }
        }

        Commands::Status => {
            let store = open_store(&config)?;
            outreach::status::show(store.as_ref(), &config.data_dir, &config.cadence, Utc::now())
                .await?;
        }
    }

    Ok(())
}

/// Open the configured record store backend.
fn open_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    info!(backend = ?config.store_backend, dir = %config.data_dir.display(), "Opening record store");
    outreach::store::open(config.store_backend, &config.data_dir)
}

/// Build the Mailgun dispatcher from configuration.
fn create_dispatcher(config: &Config) -> Result<MailgunDispatcher> {
    info!(domain = %config.mailgun_domain, "Using Mailgun dispatcher");
    MailgunDispatcher::new(
        &config.mailgun_api_key,
        &config.mailgun_domain,
        &config.from_name,
        &config.from_address,
    )
}
