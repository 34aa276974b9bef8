//! Session repository.
//!
//! A single pseudonymous session per storage profile. Destroying it also
//! clears the cart and the locally cached catalog.

use chrono::Utc;
use tracing::{info, instrument};

use anonshop_core::Pseudonym;

use super::{RepositoryError, keys};
use crate::models::UserSession;
use crate::storage::Storage;

/// Repository for the active session.
pub struct SessionRepository<'a> {
    storage: &'a Storage,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Get the active session, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn current(&self) -> Result<Option<UserSession>, RepositoryError> {
        Ok(self.storage.load(keys::SESSION)?)
    }

    /// Whether a session is active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn is_authenticated(&self) -> Result<bool, RepositoryError> {
        Ok(self.current()?.is_some())
    }

    /// Start a session under `pseudonym`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidPseudonym` if the pseudonym is not
    /// 3-20 characters of letters, digits and underscores.
    #[instrument(skip(self))]
    pub fn create(&self, pseudonym: &str) -> Result<UserSession, RepositoryError> {
        let pseudonym = Pseudonym::parse(pseudonym)?;
        let session = UserSession {
            pseudonym,
            created_at: Utc::now(),
        };
        self.storage.save(keys::SESSION, &session)?;
        info!(pseudonym = %session.pseudonym, "session created");
        Ok(session)
    }

    /// End the session and clear the cart and product keys.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn destroy(&self) -> Result<(), RepositoryError> {
        self.storage.delete(keys::SESSION)?;
        self.storage.delete(keys::CART)?;
        self.storage.delete(keys::PRODUCTS)?;
        info!("session destroyed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use anonshop_core::PseudonymError;

    use super::*;

    #[test]
    fn test_create_and_read_back() {
        let storage = Storage::in_memory();
        let repo = SessionRepository::new(&storage);

        assert!(!repo.is_authenticated().unwrap());
        let session = repo.create("crypto_dealer").unwrap();
        assert_eq!(session.pseudonym.as_str(), "crypto_dealer");
        assert_eq!(repo.current().unwrap(), Some(session));
    }

    #[test]
    fn test_invalid_pseudonym_rejected_without_writing() {
        let storage = Storage::in_memory();
        let repo = SessionRepository::new(&storage);

        for bad in ["ab", "this_name_is_far_too_long", "no spaces", "dash-ed"] {
            let err = repo.create(bad).unwrap_err();
            assert!(matches!(err, RepositoryError::InvalidPseudonym(_)), "{bad}");
        }
        assert!(matches!(
            repo.create("x").unwrap_err(),
            RepositoryError::InvalidPseudonym(PseudonymError::TooShort { min: 3 })
        ));
        assert!(!storage.contains(keys::SESSION).unwrap());
    }

    #[test]
    fn test_destroy_clears_cart_and_products() {
        let storage = Storage::in_memory();
        storage.set_raw(keys::CART, "[]").unwrap();
        storage.set_raw(keys::PRODUCTS, "[]").unwrap();
        storage.set_raw(keys::ORDERS, "[]").unwrap();

        let repo = SessionRepository::new(&storage);
        repo.create("music_anon").unwrap();
        repo.destroy().unwrap();

        assert!(repo.current().unwrap().is_none());
        assert!(!storage.contains(keys::CART).unwrap());
        assert!(!storage.contains(keys::PRODUCTS).unwrap());
        assert!(storage.contains(keys::ORDERS).unwrap());
    }

    #[test]
    fn test_corrupted_session_reads_as_logged_out() {
        let storage = Storage::in_memory();
        storage.set_raw(keys::SESSION, "{\"pseudonym\":").unwrap();

        let repo = SessionRepository::new(&storage);
        assert!(repo.current().unwrap().is_none());
        assert!(!storage.contains(keys::SESSION).unwrap());
    }
}
