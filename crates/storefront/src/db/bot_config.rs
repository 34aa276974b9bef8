//! Session messenger bot configuration repository.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tracing::{info, instrument};

use anonshop_core::Pseudonym;

use super::{RepositoryError, keys};
use crate::models::SessionBotConfig;
use crate::storage::Storage;

static SESSION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{32,64}$").expect("Invalid regex"));

/// Whether `session_id` is 32-64 ASCII letters and digits.
#[must_use]
pub fn is_valid_session_id(session_id: &str) -> bool {
    SESSION_ID_RE.is_match(session_id)
}

/// Repository for per-vendor notification bot settings.
pub struct BotConfigRepository<'a> {
    storage: &'a Storage,
}

impl<'a> BotConfigRepository<'a> {
    /// Create a new bot config repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The vendor's bot settings, if ever activated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn get(&self, vendor: &Pseudonym) -> Result<Option<SessionBotConfig>, RepositoryError> {
        Ok(self.storage.load(&keys::session_bot(vendor))?)
    }

    /// Activate the bot for `session_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the session ID is malformed,
    /// or if encryption is enabled without a PGP key.
    #[instrument(skip(self, pgp_public_key))]
    pub fn activate(
        &self,
        vendor: &Pseudonym,
        session_id: &str,
        encryption_enabled: bool,
        pgp_public_key: Option<String>,
    ) -> Result<SessionBotConfig, RepositoryError> {
        let session_id = session_id.trim();
        if !is_valid_session_id(session_id) {
            return Err(RepositoryError::Validation(
                "session ID must be 32-64 letters or digits".to_owned(),
            ));
        }
        let pgp_public_key = pgp_public_key.filter(|k| !k.trim().is_empty());
        if encryption_enabled && pgp_public_key.is_none() {
            return Err(RepositoryError::Validation(
                "encryption requires a PGP public key".to_owned(),
            ));
        }

        let config = SessionBotConfig {
            session_id: session_id.to_owned(),
            bot_active: true,
            encryption_enabled,
            pgp_public_key,
            last_activity: Some(Utc::now()),
        };
        self.storage.save(&keys::session_bot(vendor), &config)?;
        info!(vendor = %vendor, "session bot activated");
        Ok(config)
    }

    /// Change encryption settings of an existing bot and touch `last_activity`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bot was never activated, or
    /// `RepositoryError::Validation` if encryption is enabled without a key.
    #[instrument(skip(self, pgp_public_key))]
    pub fn update(
        &self,
        vendor: &Pseudonym,
        encryption_enabled: bool,
        pgp_public_key: Option<String>,
    ) -> Result<SessionBotConfig, RepositoryError> {
        let mut config = self
            .get(vendor)?
            .ok_or_else(|| RepositoryError::NotFound(format!("session bot for {vendor}")))?;

        if let Some(key) = pgp_public_key.filter(|k| !k.trim().is_empty()) {
            config.pgp_public_key = Some(key);
        }
        if encryption_enabled && config.pgp_public_key.is_none() {
            return Err(RepositoryError::Validation(
                "encryption requires a PGP public key".to_owned(),
            ));
        }
        config.encryption_enabled = encryption_enabled;
        config.last_activity = Some(Utc::now());

        self.storage.save(&keys::session_bot(vendor), &config)?;
        info!(vendor = %vendor, "session bot updated");
        Ok(config)
    }

    /// Stamp `last_activity` after the bot sent something.
    ///
    /// Returns `None` if the bot was never activated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn touch(&self, vendor: &Pseudonym) -> Result<Option<SessionBotConfig>, RepositoryError> {
        let Some(mut config) = self.get(vendor)? else {
            return Ok(None);
        };
        config.last_activity = Some(Utc::now());
        self.storage.save(&keys::session_bot(vendor), &config)?;
        Ok(Some(config))
    }

    /// Deactivate the bot, keeping its settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bot was never activated.
    #[instrument(skip(self))]
    pub fn deactivate(&self, vendor: &Pseudonym) -> Result<SessionBotConfig, RepositoryError> {
        let mut config = self
            .get(vendor)?
            .ok_or_else(|| RepositoryError::NotFound(format!("session bot for {vendor}")))?;
        config.bot_active = false;
        config.last_activity = Some(Utc::now());
        self.storage.save(&keys::session_bot(vendor), &config)?;
        info!(vendor = %vendor, "session bot deactivated");
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SESSION_ID: &str = "05d871fc80ca007eed9b2f4df72853e2a2d5465a92fcb1889fb5c84aa2833b3b";

    #[test]
    fn test_session_id_format() {
        assert!(is_valid_session_id(&"a".repeat(32)));
        assert!(is_valid_session_id(SESSION_ID));
        assert!(!is_valid_session_id(&"a".repeat(31)));
        assert!(!is_valid_session_id(&"a".repeat(65)));
        assert!(!is_valid_session_id(&format!("{}-", "a".repeat(40))));
    }

    #[test]
    fn test_activate_and_deactivate() {
        let storage = Storage::in_memory();
        let repo = BotConfigRepository::new(&storage);
        let vendor = Pseudonym::parse("crypto_dealer").unwrap();

        assert!(repo.get(&vendor).unwrap().is_none());
        let config = repo.activate(&vendor, SESSION_ID, false, None).unwrap();
        assert!(config.bot_active);

        let config = repo
            .update(&vendor, true, Some("-----BEGIN PGP PUBLIC KEY BLOCK-----".to_owned()))
            .unwrap();
        assert!(config.encryption_enabled);

        let config = repo.deactivate(&vendor).unwrap();
        assert!(!config.bot_active);
        assert!(config.pgp_public_key.is_some());
        assert_eq!(config.session_id, SESSION_ID);
    }

    #[test]
    fn test_encryption_requires_key() {
        let storage = Storage::in_memory();
        let repo = BotConfigRepository::new(&storage);
        let vendor = Pseudonym::parse("crypto_dealer").unwrap();

        let err = repo
            .activate(&vendor, SESSION_ID, true, Some("  ".to_owned()))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
        assert!(matches!(
            repo.deactivate(&vendor).unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }
}
