//! CLI subcommands.
//!
//! Each module owns one command family and logs its results through
//! `tracing`, so `--json` turns every command's output into JSON lines.

use clap::Subcommand;
use thiserror::Error;

use anonshop_core::Pseudonym;
use anonshop_storefront::config::ConfigError;
use anonshop_storefront::db::{RepositoryError, SessionRepository};
use anonshop_storefront::error::AppError;
use anonshop_storefront::services::{CaptchaError, CheckoutError, RatesError};
use anonshop_storefront::state::AppState;
use anonshop_storefront::storage::StorageError;

pub mod admin;
pub mod captcha;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod rates;
pub mod session;
pub mod vendor;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The storefront refused the operation.
    #[error(transparent)]
    App(#[from] AppError),

    /// The command needs a pseudonym but nobody is logged in.
    #[error("No active session. Run `anonshop session login <pseudonym>` first")]
    NoSession,

    /// Reading from the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

macro_rules! via_app_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CliError {
                fn from(err: $ty) -> Self {
                    Self::App(err.into())
                }
            }
        )*
    };
}

via_app_error!(
    ConfigError,
    StorageError,
    RepositoryError,
    CheckoutError,
    CaptchaError,
    RatesError,
);

#[derive(Subcommand)]
pub enum Command {
    /// Log in, log out, or show the active pseudonym
    Session {
        #[command(subcommand)]
        action: session::SessionAction,
    },
    /// Browse and manage products
    Product {
        #[command(subcommand)]
        action: catalog::ProductAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: catalog::CartAction,
    },
    /// List vendors on the marketplace front page
    Marketplace,
    /// Check out the current cart
    Checkout(checkout::CheckoutArgs),
    /// Inspect and advance orders
    Orders {
        #[command(subcommand)]
        action: orders::OrdersAction,
    },
    /// Show or convert exchange rates
    Rates {
        #[command(subcommand)]
        action: rates::RatesAction,
    },
    /// Solve a captcha challenge interactively
    Captcha,
    /// Vendor registration codes
    Codes {
        #[command(subcommand)]
        action: vendor::CodesAction,
    },
    /// Payout wallets
    Wallet {
        #[command(subcommand)]
        action: vendor::WalletAction,
    },
    /// Buyer-to-vendor messages
    Messages {
        #[command(subcommand)]
        action: vendor::MessagesAction,
    },
    /// Vendor shop banner
    Banner {
        #[command(subcommand)]
        action: vendor::BannerAction,
    },
    /// Vendor statistics feed
    Stats {
        #[command(subcommand)]
        action: vendor::StatsAction,
    },
    /// Vendor notification bot
    Bot {
        #[command(subcommand)]
        action: vendor::BotAction,
    },
    /// Vendor Telegram bot
    Telegram {
        #[command(subcommand)]
        action: vendor::TelegramAction,
    },
    /// Marketplace design settings
    Design {
        #[command(subcommand)]
        action: admin::DesignAction,
    },
    /// Vendor licenses
    License {
        #[command(subcommand)]
        action: admin::LicenseAction,
    },
}

/// Run a parsed command against the application state.
///
/// # Errors
///
/// Returns the first error raised by the command.
pub async fn dispatch(state: &AppState, command: Command) -> Result<(), CliError> {
    match command {
        Command::Session { action } => session::run(state, action)?,
        Command::Product { action } => catalog::product(state, action)?,
        Command::Cart { action } => catalog::cart(state, action)?,
        Command::Marketplace => catalog::marketplace(state)?,
        Command::Checkout(args) => checkout::run(state, args).await?,
        Command::Orders { action } => orders::run(state, action).await?,
        Command::Rates { action } => rates::run(state, action).await?,
        Command::Captcha => captcha::run(state)?,
        Command::Codes { action } => vendor::codes(state, action)?,
        Command::Wallet { action } => vendor::wallet(state, action)?,
        Command::Messages { action } => vendor::messages(state, action)?,
        Command::Banner { action } => vendor::banner(state, action)?,
        Command::Stats { action } => vendor::stats(state, action)?,
        Command::Bot { action } => vendor::bot(state, action)?,
        Command::Telegram { action } => vendor::telegram(state, action)?,
        Command::Design { action } => admin::design(state, action)?,
        Command::License { action } => admin::license(state, action)?,
    }
    Ok(())
}

/// Pseudonym of the active session.
///
/// # Errors
///
/// Returns `CliError::NoSession` if nobody is logged in.
pub fn require_session(state: &AppState) -> Result<Pseudonym, CliError> {
    SessionRepository::new(state.storage())
        .current()?
        .map(|session| session.pseudonym)
        .ok_or(CliError::NoSession)
}
