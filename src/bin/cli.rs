//! Outage Notifier CLI
//!
//! Local execution entry point. For AWS Lambda, use `outage-notifier-lambda`.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use outage_notifier::{
    context::AppContext,
    error::{AppError, Result},
    models::{ChatState, Config, Update},
    pipeline::{self, SnapshotMode},
    services::MemoryNotifier,
    storage::{ChatRegistry, LocalStorage, SnapshotStore},
};

/// Planned utility outage notifier
#[derive(Parser, Debug)]
#[command(
    name = "outage-notifier",
    version,
    about = "Notify Telegram chats about planned utility outages"
)]
struct Cli {
    /// Path to storage directory holding data.json and chats.json
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Path to config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the listing and notify subscribed chats
    Run {
        /// Print the messages instead of sending them and keep the snapshot
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply one Telegram update read from a file (`-` for stdin)
    Webhook { path: PathBuf },

    /// Print the current listing without touching storage
    Scrape,

    /// Validate configuration
    Validate,

    /// Show stored snapshot and chat info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn read_update(path: &PathBuf) -> Result<Update> {
    let body = if path.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        body
    } else {
        std::fs::read_to_string(path)?
    };
    Update::from_json(&body).map_err(AppError::webhook)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));
    let mut config = Config::load_or_default(&config_path);
    config.apply_env();
    log::info!("Loaded configuration from {}", config_path.display());

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK");
        match config.validate_for_delivery() {
            Ok(()) => log::info!("✓ Telegram token present"),
            Err(e) => log::warn!("{}", e),
        }
        return Ok(());
    }

    let storage = LocalStorage::new(&cli.storage_dir);
    let context = AppContext::new(config, storage)?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Command::Run { dry_run: false } => {
            let summary = match context.run_scheduled(today).await {
                Ok(summary) => summary,
                Err(e) if e.is_format_changed() => {
                    log::error!("{}. Stored snapshot left untouched.", e);
                    return Err(e);
                }
                Err(e) => return Err(e),
            };
            log::info!(
                "Run complete: {} record(s), {} new, {} message(s) sent",
                summary.records,
                summary.new_records,
                summary.messages_sent
            );
        }

        Command::Run { dry_run: true } => {
            let notifier = MemoryNotifier::new();
            let summary = context
                .run_with(&notifier, today, SnapshotMode::Keep)
                .await?;
            for message in notifier.messages().await {
                println!(
                    "[{}{}] {}",
                    message.chat_id,
                    message
                        .thread_id
                        .map(|t| format!("/{}", t))
                        .unwrap_or_default(),
                    message.text
                );
            }
            log::info!(
                "Dry run: {} new record(s), {} message(s) would be sent",
                summary.new_records,
                summary.messages_sent
            );
        }

        Command::Webhook { path } => {
            let update = read_update(&path)?;
            let outcome = context.handle_update(&update).await?;
            log::info!("Update handled: {:?}", outcome);
        }

        Command::Scrape => {
            let source = context.listing_source()?;
            let listing = pipeline::scrape_listing(context.config(), &source, today).await?;
            println!("{}", serde_json::to_string_pretty(&listing.records)?);
            log::info!(
                "{} record(s) from {} row(s) on {} page(s)",
                listing.records.len(),
                listing.rows,
                listing.pages
            );
        }

        Command::Info => {
            let storage = context.storage();
            log::info!("Storage directory: {}", storage.root_dir().display());

            let snapshot = storage.load_snapshot().await?;
            if snapshot.is_empty() {
                log::info!("No snapshot found yet.");
            } else {
                log::info!("Snapshot: {} record(s)", snapshot.len());
            }

            let chats = storage.list_chats().await?;
            let enabled = chats
                .iter()
                .filter(|c| c.state() == ChatState::Enabled)
                .count();
            log::info!(
                "Chats: {} registered, {} enabled, {} disabled",
                chats.len(),
                enabled,
                chats.len() - enabled
            );
            for chat in chats.iter().filter(|c| c.enabled) {
                log::info!("  {} ({}): {}", chat.chat_id, chat.name, chat.filter);
            }
        }

        Command::Validate => {}
    }

    log::info!("Done!");

    Ok(())
}
