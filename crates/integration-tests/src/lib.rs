//! Integration tests for anonshop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p anonshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - cart to per-vendor orders, across a file-backed profile
//! - `session_lifecycle` - login, logout and session-scoped vendor data
//! - `storage_recovery` - corrupted and missing profile data
//! - `address_redaction` - timed wiping of revealed delivery addresses
//!
//! Every test works on its own [`TempProfile`], so tests can run in parallel.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anonshop_storefront::config::StoreConfig;
use anonshop_storefront::state::AppState;
use anonshop_storefront::storage::{Storage, StorageError};

/// A storage profile file in the system temp directory, removed on drop.
#[derive(Debug)]
pub struct TempProfile {
    path: PathBuf,
}

impl TempProfile {
    /// Reserve a fresh, not-yet-existing profile path.
    #[must_use]
    pub fn new() -> Self {
        let path =
            std::env::temp_dir().join(format!("anonshop-it-{}.json", uuid::Uuid::new_v4()));
        Self { path }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the profile. Each call reads the file afresh, which simulates a
    /// restart of the application.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file exists but cannot be read.
    pub fn open(&self) -> Result<Storage, StorageError> {
        Storage::open(&self.path)
    }

    /// Application state over this profile with offline exchange rates and
    /// the given redaction delay.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile can't be opened or the rates client
    /// fails to build.
    pub fn state(&self, redaction_delay: Duration) -> Result<AppState, Box<dyn std::error::Error>> {
        let mut config = StoreConfig {
            data_path: self.path.clone(),
            redaction_delay,
            ..StoreConfig::default()
        };
        config.rates.offline = true;

        Ok(AppState::new(config, self.open()?)?)
    }
}

impl Default for TempProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempProfile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
