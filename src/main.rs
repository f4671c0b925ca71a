use anyhow::Context;
use clap::Parser;
use saga_scout::ledger::KnownOffers;
use saga_scout::notify::TelegramNotifier;
use saga_scout::scrapers::{SagaClient, SiteLayout};
use saga_scout::{AppConfig, Scout};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "saga-scout", about = "Polls SAGA listings and forwards matching offers to Telegram")]
struct Args {
    /// Path to the JSON configuration
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Log what debug chats would match right now, ignoring known offers
    #[arg(long)]
    diagnose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    info!("🏠 SAGA Scout");
    info!("==========================================");

    let config = AppConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let settings = &config.settings;
    info!("Chats: {:?}", config.chats.keys().collect::<Vec<_>>());

    let fetcher = SagaClient::new(settings.request_timeout()).context("Failed to create HTTP client")?;
    let notifier = TelegramNotifier::new(
        &settings.telegram_api_base,
        &config.telegram_token,
        settings.request_timeout(),
    )
    .context("Failed to create Telegram client")?;
    let ledger = KnownOffers::open(&settings.ledger_path)
        .with_context(|| format!("Failed to open {}", settings.ledger_path.display()))?
        .with_max_entries(settings.ledger_max_entries);

    let mut scout = Scout::new(fetcher, notifier, ledger, SiteLayout::default());

    if args.diagnose {
        match scout.diagnose(&config).await {
            Ok(matches) => info!("💡 Debug chats would match {} offers", matches),
            Err(e) => warn!("Diagnosis failed: {}", e),
        }
    }

    scout.announce_startup(&config).await;

    let config_path = args.config.clone();
    scout
        .run(&config_path, config, args.once)
        .await
        .context("Stopped polling")?;

    Ok(())
}
