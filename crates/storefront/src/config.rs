//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `ANONSHOP_DATA_PATH` - Storage profile file (default: anonshop-data.json)
//! - `ANONSHOP_REDACTION_DELAY_SECS` - Delay before a viewed address is wiped (default: 5)
//! - `ANONSHOP_PAYMENT_WINDOW_MINUTES` - Time a buyer has to pay, at most one week (default: 60)
//! - `ANONSHOP_RATES_URL` - Exchange rate endpoint (default: `CoinGecko` simple price, EUR)
//! - `ANONSHOP_RATES_TIMEOUT_SECS` - Rate request timeout (default: 5)
//! - `ANONSHOP_RATES_REFRESH_SECS` - How long fetched rates are reused (default: 60)
//! - `ANONSHOP_CAPTCHA_MAX_ATTEMPTS` - Misses before the captcha cools down (default: 3)
//! - `ANONSHOP_CAPTCHA_COOLDOWN_SECS` - Captcha cooldown length (default: 30)
//! - `ANONSHOP_OFFLINE` - Never fetch rates, always use defaults (default: false)

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default exchange rate endpoint.
pub const DEFAULT_RATES_URL: &str = "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin,ethereum,monero,litecoin,tether&vs_currencies=eur";

/// Longest accepted payment window: one week.
pub const MAX_PAYMENT_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level storefront configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the file-backed storage profile.
    pub data_path: PathBuf,
    /// How long a revealed delivery address stays readable.
    pub redaction_delay: Duration,
    /// Minutes between order creation and its payment deadline.
    pub payment_window_minutes: i64,
    /// Exchange rate fetching.
    pub rates: RatesConfig,
    /// Captcha throttling.
    pub captcha: CaptchaConfig,
}

/// Exchange rate client configuration.
#[derive(Debug, Clone)]
pub struct RatesConfig {
    pub url: Url,
    pub timeout: Duration,
    pub refresh: Duration,
    /// Skip the network entirely and serve default rates.
    pub offline: bool,
}

/// Captcha throttling configuration.
#[derive(Debug, Clone, Copy)]
pub struct CaptchaConfig {
    pub max_attempts: u32,
    pub cooldown: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("anonshop-data.json"),
            redaction_delay: Duration::from_secs(5),
            payment_window_minutes: 60,
            rates: RatesConfig::default(),
            captcha: CaptchaConfig::default(),
        }
    }
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            url: default_rates_url(),
            timeout: Duration::from_secs(5),
            refresh: Duration::from_secs(60),
            offline: false,
        }
    }
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown: Duration::from_secs(30),
        }
    }
}

fn default_rates_url() -> Url {
    Url::parse(DEFAULT_RATES_URL).expect("default rates URL is valid")
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_path = lookup("ANONSHOP_DATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.data_path, PathBuf::from);

        let redaction_delay = Duration::from_secs(parse_or_default(
            &lookup,
            "ANONSHOP_REDACTION_DELAY_SECS",
            defaults.redaction_delay.as_secs(),
        )?);

        let payment_window_minutes = parse_or_default(
            &lookup,
            "ANONSHOP_PAYMENT_WINDOW_MINUTES",
            defaults.payment_window_minutes,
        )?;
        if !(1..=MAX_PAYMENT_WINDOW_MINUTES).contains(&payment_window_minutes) {
            return Err(ConfigError::InvalidEnvVar(
                "ANONSHOP_PAYMENT_WINDOW_MINUTES".to_string(),
                format!("must be between 1 and {MAX_PAYMENT_WINDOW_MINUTES}"),
            ));
        }

        let rates = RatesConfig::from_lookup(&lookup, defaults.rates)?;
        let captcha = CaptchaConfig::from_lookup(&lookup, defaults.captcha)?;

        Ok(Self {
            data_path,
            redaction_delay,
            payment_window_minutes,
            rates,
            captcha,
        })
    }
}

impl RatesConfig {
    fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
        defaults: Self,
    ) -> Result<Self, ConfigError> {
        let url = match lookup("ANONSHOP_RATES_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("ANONSHOP_RATES_URL".to_string(), e.to_string())
            })?,
            None => defaults.url,
        };

        Ok(Self {
            url,
            timeout: Duration::from_secs(parse_or_default(
                lookup,
                "ANONSHOP_RATES_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            refresh: Duration::from_secs(parse_or_default(
                lookup,
                "ANONSHOP_RATES_REFRESH_SECS",
                defaults.refresh.as_secs(),
            )?),
            offline: parse_flag(lookup, "ANONSHOP_OFFLINE")?.unwrap_or(defaults.offline),
        })
    }
}

impl CaptchaConfig {
    fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
        defaults: Self,
    ) -> Result<Self, ConfigError> {
        let max_attempts =
            parse_or_default(lookup, "ANONSHOP_CAPTCHA_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ANONSHOP_CAPTCHA_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            max_attempts,
            cooldown: Duration::from_secs(parse_or_default(
                lookup,
                "ANONSHOP_CAPTCHA_COOLDOWN_SECS",
                defaults.cooldown.as_secs(),
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a boolean flag (`1`/`0`, `true`/`false`, `yes`/`no`).
fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.data_path, PathBuf::from("anonshop-data.json"));
        assert_eq!(config.redaction_delay, Duration::from_secs(5));
        assert_eq!(config.payment_window_minutes, 60);
        assert_eq!(config.rates.url.as_str(), DEFAULT_RATES_URL);
        assert_eq!(config.rates.refresh, Duration::from_secs(60));
        assert!(!config.rates.offline);
        assert_eq!(config.captcha.max_attempts, 3);
        assert_eq!(config.captcha.cooldown, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("ANONSHOP_DATA_PATH", "/tmp/profile.json"),
            ("ANONSHOP_REDACTION_DELAY_SECS", "1"),
            ("ANONSHOP_RATES_URL", "http://localhost:9000/rates"),
            ("ANONSHOP_OFFLINE", "yes"),
            ("ANONSHOP_CAPTCHA_MAX_ATTEMPTS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("/tmp/profile.json"));
        assert_eq!(config.redaction_delay, Duration::from_secs(1));
        assert_eq!(config.rates.url.host_str(), Some("localhost"));
        assert!(config.rates.offline);
        assert_eq!(config.captcha.max_attempts, 5);
    }

    #[test]
    fn test_invalid_number() {
        let err = StoreConfig::from_lookup(lookup_from(&[(
            "ANONSHOP_REDACTION_DELAY_SECS",
            "soon",
        )]))
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ANONSHOP_REDACTION_DELAY_SECS")
        );
    }

    #[test]
    fn test_invalid_url() {
        let result = StoreConfig::from_lookup(lookup_from(&[("ANONSHOP_RATES_URL", "not a url")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_flag_and_zero_values() {
        assert!(StoreConfig::from_lookup(lookup_from(&[("ANONSHOP_OFFLINE", "maybe")])).is_err());
        assert!(
            StoreConfig::from_lookup(lookup_from(&[("ANONSHOP_PAYMENT_WINDOW_MINUTES", "0")]))
                .is_err()
        );
        assert!(
            StoreConfig::from_lookup(lookup_from(&[("ANONSHOP_CAPTCHA_MAX_ATTEMPTS", "0")]))
                .is_err()
        );
    }

    #[test]
    fn test_payment_window_bounds() {
        let config =
            StoreConfig::from_lookup(lookup_from(&[("ANONSHOP_PAYMENT_WINDOW_MINUTES", "10080")]))
                .unwrap();
        assert_eq!(config.payment_window_minutes, MAX_PAYMENT_WINDOW_MINUTES);

        for value in ["10081", "-5", "9223372036854775807"] {
            let err =
                StoreConfig::from_lookup(lookup_from(&[("ANONSHOP_PAYMENT_WINDOW_MINUTES", value)]))
                    .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ANONSHOP_PAYMENT_WINDOW_MINUTES"),
                "{value} should be rejected"
            );
        }
    }
}
