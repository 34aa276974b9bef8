//! Telegram bot settings repository.

use chrono::Utc;
use tracing::{info, instrument};

use anonshop_core::Pseudonym;

use super::{RepositoryError, keys};
use crate::models::TelegramBotConfig;
use crate::storage::Storage;

/// Repository for per-vendor Telegram bot settings.
pub struct TelegramBotRepository<'a> {
    storage: &'a Storage,
}

impl<'a> TelegramBotRepository<'a> {
    /// Create a new Telegram bot repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The vendor's saved settings, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn get(&self, vendor: &Pseudonym) -> Result<Option<TelegramBotConfig>, RepositoryError> {
        Ok(self.storage.load(&keys::telegram_bot(vendor))?)
    }

    /// Save the settings and stamp `updated_at`.
    ///
    /// A disabled bot may keep blank credentials.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the bot is enabled without a
    /// token or group ID.
    #[instrument(skip(self, bot_token))]
    pub fn save(
        &self,
        vendor: &Pseudonym,
        enabled: bool,
        bot_token: &str,
        group_id: &str,
    ) -> Result<TelegramBotConfig, RepositoryError> {
        let bot_token = bot_token.trim();
        let group_id = group_id.trim();
        if enabled && (bot_token.is_empty() || group_id.is_empty()) {
            return Err(RepositoryError::Validation(
                "bot token and group ID are required when the bot is enabled".to_owned(),
            ));
        }

        let config = TelegramBotConfig {
            enabled,
            bot_token: bot_token.to_owned(),
            group_id: group_id.to_owned(),
            updated_at: Utc::now(),
        };
        self.storage.save(&keys::telegram_bot(vendor), &config)?;
        info!(vendor = %vendor, enabled, "telegram bot saved");
        Ok(config)
    }

    /// Switch the bot off, keeping the stored credentials.
    ///
    /// Returns `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn disable(&self, vendor: &Pseudonym) -> Result<Option<TelegramBotConfig>, RepositoryError> {
        let Some(mut config) = self.get(vendor)? else {
            return Ok(None);
        };
        config.enabled = false;
        config.updated_at = Utc::now();

        self.storage.save(&keys::telegram_bot(vendor), &config)?;
        info!(vendor = %vendor, "telegram bot disabled");
        Ok(Some(config))
    }
}
