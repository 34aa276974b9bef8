//! anonshop CLI - drive the storefront state layer from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Start a session under a pseudonym
//! anonshop session login crypto_dealer
//!
//! # Put a product into the cart and check out in Monero
//! anonshop cart add demo-1
//! anonshop checkout --currency XMR --name "A" --street "B 1" --city C \
//!     --postal-code 12345 --country DE --tx-hash 0xabc
//!
//! # Reveal the delivery address of an order and wait for its redaction
//! anonshop orders reveal <order-id> --wait
//! ```
//!
//! # Environment Variables
//!
//! - `ANONSHOP_DATA_PATH` - JSON file backing the storage profile
//! - `ANONSHOP_REDACTION_DELAY_SECS` - Delay before a viewed address is wiped
//! - `ANONSHOP_PAYMENT_WINDOW_MINUTES` - Payment deadline for new orders
//! - `ANONSHOP_RATES_URL` / `ANONSHOP_OFFLINE` - Exchange rate source
//! - `RUST_LOG` - Log filter (defaults to
//!   `anonshop_storefront=info,anonshop_cli=info,anonshop::notify=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anonshop_storefront::config::StoreConfig;
use anonshop_storefront::state::AppState;
use anonshop_storefront::storage::Storage;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "anonshop")]
#[command(author, version, about = "anonshop storefront CLI")]
struct Cli {
    /// Storage profile to use instead of `ANONSHOP_DATA_PATH`
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Use built-in exchange rates instead of fetching them
    #[arg(long, global = true)]
    offline: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "anonshop_storefront=info,anonshop_cli=info,anonshop::notify=info".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(cli.json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json).then(tracing_subscriber::fmt::layer))
        .init();

    if let Err(e) = run(cli).await {
        error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = StoreConfig::from_env()?;
    if let Some(path) = cli.data {
        config.data_path = path;
    }
    if cli.offline {
        config.rates.offline = true;
    }

    let storage = Storage::open(&config.data_path)?;
    let state = AppState::new(config, storage)?;

    commands::dispatch(&state, cli.command).await
}
