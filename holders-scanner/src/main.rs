//! Holders Scanner CLI
//!
//! Collection holders and weighted raffles on Algorand.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use holders::LedgerCollectionClient;
use holders_scanner::{
    commands::{self, RaffleOptions},
    config::HoldersConfig,
    output::{JsonFileHandler, OutputHandler, StdoutHandler},
    AlgorandLedger,
};

#[derive(Parser)]
#[command(name = "holders-scanner")]
#[command(about = "Collection holders and weighted raffles for Algorand NFTs")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "holders.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate the holders of every configured collection
    Holders {
        /// Output file (defaults to `holdings_file` from the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Draw unique winners, weighted by collection and amount held
    Raffle {
        /// Number of winners (overrides the configuration)
        #[arg(short, long)]
        winners: Option<usize>,

        /// Seed for the draw (overrides the configuration)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write the winners to this file instead of printing them as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON written to stdout
        #[arg(long)]
        pretty: bool,
    },

    /// Check whether an asset is held by a genuine owner
    Owned {
        /// Asset id
        #[arg(short, long)]
        asset_id: u64,
    },

    /// Validate configuration file
    ValidateConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level)?;

    // Load configuration
    let config = match HoldersConfig::from_file(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            if matches!(cli.command, Commands::ValidateConfig) {
                eprintln!("Configuration validation failed: {}", e);
                std::process::exit(1);
            }
            anyhow::bail!("Failed to load config from {:?}: {}", cli.config, e);
        }
    };

    let result = match cli.command {
        Commands::Holders { output } => run_holders(&config, output).await,
        Commands::Raffle {
            winners,
            seed,
            output,
            pretty,
        } => run_raffle(&config, RaffleOptions { winners, seed }, output, pretty).await,
        Commands::Owned { asset_id } => check_owned(&config, asset_id).await,
        Commands::ValidateConfig => {
            show_config(&config);
            Ok(())
        }
    };

    if let Err(e) = &result {
        if commands::is_programmer_error(e) {
            tracing::error!("Aborting on internal error: {:#}", e);
            std::process::exit(2);
        }
    }
    result
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

type Client = LedgerCollectionClient<AlgorandLedger>;

fn collection_client(config: &HoldersConfig) -> Result<Arc<Client>> {
    let ledger = AlgorandLedger::from_config(&config.ledger)?;
    Ok(Arc::new(LedgerCollectionClient::new(ledger)))
}

async fn run_holders(config: &HoldersConfig, output: Option<PathBuf>) -> Result<()> {
    let client = collection_client(config)?;
    let handler = JsonFileHandler::new(output.unwrap_or_else(|| config.holdings_file.clone()));

    let holdings = commands::scan_holdings(client, config, &handler).await?;

    println!(
        "Wrote holdings of {} collections to {:?}",
        holdings.len(),
        handler.path()
    );
    Ok(())
}

async fn run_raffle(
    config: &HoldersConfig,
    options: RaffleOptions,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<()> {
    let client = collection_client(config)?;
    let handler: Box<dyn OutputHandler> = match output {
        Some(path) => Box::new(JsonFileHandler::new(path)),
        None => Box::new(StdoutHandler::with_pretty(pretty)),
    };

    let outcome = commands::raffle(client, config, &options, handler.as_ref()).await?;

    // Winners already went to stdout as JSON; keep it parseable.
    if handler.prints_results() {
        eprintln!("Seed: {}", outcome.seed);
        return Ok(());
    }

    println!("Seed: {}", outcome.seed);
    for (place, winner) in outcome.winners.iter().enumerate() {
        println!(
            "{}: {} ({} / asset {})",
            place + 1,
            winner.address,
            winner.unit_name,
            winner.asset_id
        );
    }
    Ok(())
}

async fn check_owned(config: &HoldersConfig, asset_id: u64) -> Result<()> {
    let client = collection_client(config)?;

    match commands::asset_ownership(client.as_ref(), asset_id).await? {
        Some(true) => println!("Asset {} is owned", asset_id),
        Some(false) => println!("Asset {} is not owned (creator or escrow)", asset_id),
        None => println!("Asset {} has no holders", asset_id),
    }
    Ok(())
}

fn show_config(config: &HoldersConfig) {
    println!("Configuration is valid.");
    println!("  Algod: {}", config.ledger.algod_url);
    println!("  Indexer: {}", config.ledger.indexer_url);
    println!("  Concurrency: {}", config.concurrency);
    println!("  Winners: {}", config.raffle.winners);
    println!("  Collections:");
    for wc in &config.collections {
        println!(
            "    {} (weight {}, {} addresses)",
            wc.collection.name,
            wc.weight,
            wc.collection.addresses.len()
        );
    }
    println!("  Excluded wallets: {}", config.excluded_wallets().len());
}
