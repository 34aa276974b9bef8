//! Application state shared across commands.

use std::sync::Arc;

use chrono::Duration;

use crate::config::{MAX_PAYMENT_WINDOW_MINUTES, StoreConfig};
use crate::services::{RatesClient, RatesError, RedactionScheduler};
use crate::storage::Storage;

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the storage profile and the rates client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    storage: Storage,
    rates: RatesClient,
    redaction: RedactionScheduler,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `storage` - Storage profile every repository reads and writes
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client for exchange rates fails to build.
    pub fn new(config: StoreConfig, storage: Storage) -> Result<Self, RatesError> {
        let rates = RatesClient::new(&config.rates)?;
        let redaction = RedactionScheduler::new(storage.clone(), config.redaction_delay);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                rates,
                redaction,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the storage profile.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    /// Get a reference to the exchange rates client.
    #[must_use]
    pub fn rates(&self) -> &RatesClient {
        &self.inner.rates
    }

    /// Get a reference to the address redaction scheduler.
    #[must_use]
    pub fn redaction(&self) -> &RedactionScheduler {
        &self.inner.redaction
    }

    /// Payment window applied to new orders, clamped to one minute .. one week.
    #[must_use]
    pub fn payment_window(&self) -> Duration {
        Duration::minutes(
            self.inner
                .config
                .payment_window_minutes
                .clamp(1, MAX_PAYMENT_WINDOW_MINUTES),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_state_shares_storage() {
        let state = AppState::new(StoreConfig::default(), Storage::in_memory()).unwrap();
        let clone = state.clone();

        state.storage().set_raw("k", "v").unwrap();
        assert_eq!(clone.storage().get_raw("k").unwrap().as_deref(), Some("v"));
        assert_eq!(state.payment_window(), Duration::minutes(60));
    }

    #[test]
    fn test_payment_window_is_clamped() {
        let config = StoreConfig {
            payment_window_minutes: i64::MAX,
            ..StoreConfig::default()
        };
        let state = AppState::new(config, Storage::in_memory()).unwrap();
        assert_eq!(
            state.payment_window(),
            Duration::minutes(MAX_PAYMENT_WINDOW_MINUTES)
        );
    }
}
