//! Vendor-facing commands: registration codes, wallets, messages, banner,
//! statistics and the messenger bots.
//!
//! Everything scoped to a vendor acts on the active session's pseudonym.

use clap::{ArgAction, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use anonshop_core::{ContactMethod, Currency, MessageId, Pseudonym, StatId, StatKind, VendorCodeId};
use anonshop_storefront::db::{
    BannerRepository, BotConfigRepository, MessageRepository, TelegramBotRepository,
    VendorCodeRepository, VendorStatsRepository, WalletRepository,
};
use anonshop_storefront::models::{NewMessage, NewVendorStat, TelegramBotConfig, VendorBanner};
use anonshop_storefront::state::AppState;

use super::{CliError, require_session};

#[derive(Subcommand)]
pub enum CodesAction {
    /// Generate fresh registration codes
    Generate {
        #[arg(default_value_t = 1)]
        count: usize,
    },
    /// List all codes
    List,
    /// Delete a code
    Delete { id: VendorCodeId },
    /// Redeem a code for the active session
    Redeem { code: String },
    /// Used and available code counts
    Counts,
}

#[derive(Subcommand)]
pub enum WalletAction {
    /// Show the admin wallets and your payout wallet
    Show,
    /// Set the admin BTC and XMR wallets
    SetAdmin { btc: String, xmr: String },
    /// Set your USDT payout wallet (TRC20, ERC20 or Omni)
    Set { address: String },
    /// List every vendor payout wallet
    Records,
}

#[derive(Subcommand)]
pub enum MessagesAction {
    /// List messages sent to you
    List,
    /// Send a message to a vendor
    Send {
        vendor: Pseudonym,
        /// session or signal
        #[arg(long = "via", default_value = "session")]
        contact_method: ContactMethod,
        /// Where the vendor should reply
        contact_value: String,
        message: String,
    },
    /// Mark a message as read
    Read { id: MessageId },
    /// Delete a message
    Delete { id: MessageId },
}

#[derive(Subcommand)]
pub enum BannerAction {
    /// Show your banner
    Show,
    /// Show or hide your shop on the marketplace
    Visible {
        #[arg(action = ArgAction::Set)]
        visible: bool,
    },
    /// Toggle invisible mode
    Invisible {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Rename your shop
    Name { name: String },
    /// Set or clear the banner image
    Image { url: Option<String> },
}

#[derive(Subcommand)]
pub enum StatsAction {
    /// List your statistics feed
    List,
    /// Add an entry
    Add {
        /// sale, view or contact
        kind: StatKind,
        description: String,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        currency: Option<Currency>,
    },
    /// Delete an entry
    Delete { id: StatId },
    /// Delete every entry
    Clear,
}

#[derive(Subcommand)]
pub enum BotAction {
    /// Show the bot configuration
    Show,
    /// Activate the bot for a Session ID
    Activate {
        session_id: String,
        /// Encrypt notifications with a PGP key
        #[arg(long)]
        encrypt: bool,
        #[arg(long)]
        pgp_key: Option<String>,
    },
    /// Change the encryption settings of an active bot
    Update {
        #[arg(long)]
        encrypt: bool,
        #[arg(long)]
        pgp_key: Option<String>,
    },
    /// Deactivate the bot
    Deactivate,
}

#[derive(Subcommand)]
pub enum TelegramAction {
    /// Show the Telegram bot settings
    Show,
    /// Save the bot token and group, enabling the bot
    Set {
        #[arg(long)]
        token: String,
        #[arg(long)]
        group_id: String,
        /// Store the credentials without enabling the bot
        #[arg(long)]
        disabled: bool,
    },
    /// Disable the bot, keeping its credentials
    Disable,
}

fn log_banner(banner: &VendorBanner) {
    info!(
        vendor = %banner.pseudonym,
        shop_name = %banner.shop_name,
        visible = banner.is_visible,
        invisible_mode = banner.invisible_mode,
        image = banner.banner_image.as_deref().unwrap_or("-"),
        listed = banner.is_listed(),
        "Banner"
    );
}

/// Run a registration code command.
///
/// # Errors
///
/// Returns an error if the code is unknown or used, or storage fails.
pub fn codes(state: &AppState, action: CodesAction) -> Result<(), CliError> {
    let codes = VendorCodeRepository::new(state.storage());

    match action {
        CodesAction::Generate { count } => {
            for code in codes.generate(count)? {
                info!(id = %code.id, code = %code.code, "Code generated");
            }
        }
        CodesAction::List => {
            for code in codes.list()? {
                info!(
                    id = %code.id,
                    code = %code.code,
                    used = code.is_used,
                    used_by = code.used_by.as_ref().map_or("-", Pseudonym::as_str),
                    "Code"
                );
            }
        }
        CodesAction::Delete { id } => {
            let deleted = codes.delete(&id)?;
            info!(id = %id, deleted, "Code delete");
        }
        CodesAction::Redeem { code } => {
            let redeemed = codes.redeem(&code, &require_session(state)?)?;
            info!(code = %redeemed.code, "Code redeemed");
        }
        CodesAction::Counts => {
            let counts = codes.counts()?;
            info!(
                total = counts.total,
                used = counts.used,
                available = counts.available,
                "Code counts"
            );
        }
    }
    Ok(())
}

/// Run a wallet command.
///
/// # Errors
///
/// Returns an error if an address is invalid or storage fails.
pub fn wallet(state: &AppState, action: WalletAction) -> Result<(), CliError> {
    let wallets = WalletRepository::new(state.storage());

    match action {
        WalletAction::Show => {
            let admin = wallets.admin_wallets()?;
            info!(btc = %admin.btc_address, xmr = %admin.xmr_address, "Admin wallets");
            let vendor = require_session(state)?;
            match wallets.vendor_wallet(&vendor)? {
                Some(address) => info!(vendor = %vendor, address = %address, "Payout wallet"),
                None => info!(vendor = %vendor, "No payout wallet set"),
            }
        }
        WalletAction::SetAdmin { btc, xmr } => {
            wallets.update_admin_wallets(&btc, &xmr)?;
            info!("Admin wallets updated");
        }
        WalletAction::Set { address } => {
            let record = wallets.set_vendor_wallet(&require_session(state)?, &address)?;
            info!(vendor = %record.pseudonym, address = %record.wallet_address, "Payout wallet set");
        }
        WalletAction::Records => {
            for record in wallets.vendor_records()? {
                info!(
                    vendor = %record.pseudonym,
                    address = %record.wallet_address,
                    updated = %record.last_updated,
                    "Payout wallet"
                );
            }
        }
    }
    Ok(())
}

/// Run a message command.
///
/// # Errors
///
/// Returns an error if the message is incomplete or storage fails.
pub fn messages(state: &AppState, action: MessagesAction) -> Result<(), CliError> {
    let messages = MessageRepository::new(state.storage());

    match action {
        MessagesAction::List => {
            let vendor = require_session(state)?;
            for message in messages.list(&vendor)? {
                info!(
                    id = %message.id,
                    via = %message.contact_method,
                    contact = %message.contact_value,
                    read = message.read,
                    at = %message.timestamp,
                    "{}",
                    message.message
                );
            }
            let unread = messages.unread_count(&vendor)?;
            info!(unread, "Unread messages");
        }
        MessagesAction::Send {
            vendor,
            contact_method,
            contact_value,
            message,
        } => {
            let sent = messages.send(
                &vendor,
                NewMessage {
                    contact_method,
                    contact_value,
                    message,
                },
            )?;
            info!(id = %sent.id, vendor = %vendor, "Message sent");
        }
        MessagesAction::Read { id } => {
            let updated = messages.mark_read(&require_session(state)?, &id)?;
            info!(id = %id, updated, "Message marked read");
        }
        MessagesAction::Delete { id } => {
            let deleted = messages.delete(&require_session(state)?, &id)?;
            info!(id = %id, deleted, "Message delete");
        }
    }
    Ok(())
}

/// Run a banner command.
///
/// # Errors
///
/// Returns an error if nobody is logged in or storage fails.
pub fn banner(state: &AppState, action: BannerAction) -> Result<(), CliError> {
    let banners = BannerRepository::new(state.storage());
    let vendor = require_session(state)?;

    let banner = match action {
        BannerAction::Show => banners.get(&vendor)?,
        BannerAction::Visible { visible } => banners.set_visibility(&vendor, visible)?,
        BannerAction::Invisible { enabled } => banners.set_invisible_mode(&vendor, enabled)?,
        BannerAction::Name { name } => banners.set_shop_name(&vendor, &name)?,
        BannerAction::Image { url } => banners.set_banner_image(&vendor, url)?,
    };
    log_banner(&banner);
    Ok(())
}

/// Run a statistics command.
///
/// # Errors
///
/// Returns an error if nobody is logged in or storage fails.
pub fn stats(state: &AppState, action: StatsAction) -> Result<(), CliError> {
    let stats = VendorStatsRepository::new(state.storage());
    let vendor = require_session(state)?;

    match action {
        StatsAction::List => {
            for stat in stats.list(&vendor)? {
                info!(
                    id = %stat.id,
                    kind = %stat.kind,
                    amount = ?stat.amount,
                    currency = ?stat.currency,
                    at = %stat.timestamp,
                    "{}",
                    stat.description
                );
            }
        }
        StatsAction::Add {
            kind,
            description,
            amount,
            currency,
        } => {
            let stat = stats.add(
                &vendor,
                NewVendorStat {
                    kind,
                    description,
                    amount,
                    currency,
                },
            )?;
            info!(id = %stat.id, "Stat added");
        }
        StatsAction::Delete { id } => {
            let deleted = stats.delete(&vendor, &id)?;
            info!(id = %id, deleted, "Stat delete");
        }
        StatsAction::Clear => {
            stats.clear(&vendor)?;
            info!("Stats cleared");
        }
    }
    Ok(())
}

/// Run a bot command.
///
/// # Errors
///
/// Returns an error if the Session ID or key is invalid, or storage fails.
pub fn bot(state: &AppState, action: BotAction) -> Result<(), CliError> {
    let bots = BotConfigRepository::new(state.storage());
    let vendor = require_session(state)?;

    let config = match action {
        BotAction::Show => match bots.get(&vendor)? {
            Some(config) => config,
            None => {
                info!(vendor = %vendor, "Bot not configured");
                return Ok(());
            }
        },
        BotAction::Activate {
            session_id,
            encrypt,
            pgp_key,
        } => bots.activate(&vendor, &session_id, encrypt, pgp_key)?,
        BotAction::Update { encrypt, pgp_key } => bots.update(&vendor, encrypt, pgp_key)?,
        BotAction::Deactivate => bots.deactivate(&vendor)?,
    };

    info!(
        vendor = %vendor,
        session_id = %config.session_id,
        active = config.bot_active,
        encryption = config.encryption_enabled,
        "Bot"
    );
    Ok(())
}

fn log_telegram(vendor: &Pseudonym, config: &TelegramBotConfig) {
    info!(
        vendor = %vendor,
        enabled = config.enabled,
        group_id = %config.group_id,
        token_set = !config.bot_token.is_empty(),
        updated = %config.updated_at,
        "Telegram bot"
    );
}

/// Run a Telegram bot command.
///
/// # Errors
///
/// Returns an error if an enabled bot lacks credentials, or storage fails.
pub fn telegram(state: &AppState, action: TelegramAction) -> Result<(), CliError> {
    let bots = TelegramBotRepository::new(state.storage());
    let vendor = require_session(state)?;

    let config = match action {
        TelegramAction::Show => bots.get(&vendor)?,
        TelegramAction::Set {
            token,
            group_id,
            disabled,
        } => Some(bots.save(&vendor, !disabled, &token, &group_id)?),
        TelegramAction::Disable => bots.disable(&vendor)?,
    };

    match config {
        Some(config) => log_telegram(&vendor, &config),
        None => info!(vendor = %vendor, "Telegram bot not configured"),
    }
    Ok(())
}
