//! Crypto exchange rates.
//!
//! Rates are fetched best-effort from a public price API and cached for the
//! configured refresh interval using `moka`. Any failure (network, status,
//! body, a missing or non-positive price) falls back to a built-in default
//! for the affected currency, so callers always get a usable table.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use moka::future::Cache;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use anonshop_core::Currency;

use crate::config::RatesConfig;

/// Decimal places kept when converting into a crypto amount.
pub const CRYPTO_DECIMALS: u32 = 6;

const CACHE_KEY: &str = "eur";

/// Errors that can occur when fetching rates.
#[derive(Debug, Error)]
pub enum RatesError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: status {0}")]
    Api(u16),
}

/// EUR price of one unit of each supported currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateTable {
    eur_per_unit: BTreeMap<Currency, Decimal>,
}

impl Default for RateTable {
    fn default() -> Self {
        let eur_per_unit = Currency::PAYABLE
            .into_iter()
            .map(|c| (c, default_rate(c)))
            .collect();
        Self { eur_per_unit }
    }
}

/// Fallback EUR price for one unit of `currency`.
#[must_use]
pub fn default_rate(currency: Currency) -> Decimal {
    match currency {
        Currency::BTC => Decimal::from(45_000),
        Currency::ETH => Decimal::from(2_800),
        Currency::XMR => Decimal::from(180),
        Currency::LTC => Decimal::from(85),
        Currency::USDT | Currency::EUR => Decimal::ONE,
    }
}

/// Identifier the price API uses for `currency`.
const fn api_id(currency: Currency) -> Option<&'static str> {
    match currency {
        Currency::BTC => Some("bitcoin"),
        Currency::ETH => Some("ethereum"),
        Currency::XMR => Some("monero"),
        Currency::LTC => Some("litecoin"),
        Currency::USDT => Some("tether"),
        Currency::EUR => None,
    }
}

/// Raw price API body: `{"bitcoin": {"eur": 45000.0}, ...}`.
pub type PriceResponse = HashMap<String, HashMap<String, f64>>;

impl RateTable {
    /// Build a table from a price API body, falling back per currency.
    #[must_use]
    pub fn from_response(response: &PriceResponse) -> Self {
        let mut table = Self::default();
        for currency in Currency::PAYABLE {
            let fetched = api_id(currency)
                .and_then(|id| response.get(id))
                .and_then(|prices| prices.get("eur"))
                .and_then(|&eur| Decimal::from_f64(eur))
                .filter(|rate| *rate > Decimal::ZERO);

            match fetched {
                Some(rate) => {
                    table.eur_per_unit.insert(currency, rate);
                }
                None => warn!(%currency, "rate missing from response, using default"),
            }
        }
        table
    }

    /// EUR price of one unit of `currency`.
    #[must_use]
    pub fn eur_per_unit(&self, currency: Currency) -> Decimal {
        if currency == Currency::EUR {
            return Decimal::ONE;
        }
        self.eur_per_unit
            .get(&currency)
            .copied()
            .unwrap_or_else(|| default_rate(currency))
    }

    /// Convert a EUR amount into `currency`, rounded to six decimal places.
    #[must_use]
    pub fn convert_eur_to_crypto(&self, amount_eur: Decimal, currency: Currency) -> Decimal {
        amount_eur
            .checked_div(self.eur_per_unit(currency))
            .unwrap_or(Decimal::ZERO)
            .round_dp(CRYPTO_DECIMALS)
    }

    /// Convert between two currencies via EUR, rounded to six decimal places.
    ///
    /// Returns `None` if the amount can't be represented on the way.
    #[must_use]
    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Option<Decimal> {
        if from == to {
            return Some(amount);
        }
        let eur = amount.checked_mul(self.eur_per_unit(from))?;
        eur.checked_div(self.eur_per_unit(to))
            .map(|converted| converted.round_dp(CRYPTO_DECIMALS))
    }

    /// Iterate `(currency, eur_per_unit)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
        self.eur_per_unit.iter().map(|(c, r)| (*c, *r))
    }
}

/// Client for the exchange rate API.
///
/// Cheaply cloneable; the fetched table is shared for the refresh interval.
#[derive(Clone)]
pub struct RatesClient {
    inner: Arc<RatesClientInner>,
}

struct RatesClientInner {
    client: reqwest::Client,
    url: Url,
    offline: bool,
    cache: Cache<&'static str, RateTable>,
}

impl RatesClient {
    /// Create a new rates client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RatesConfig) -> Result<Self, RatesError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.refresh)
            .build();

        Ok(Self {
            inner: Arc::new(RatesClientInner {
                client,
                url: config.url.clone(),
                offline: config.offline,
                cache,
            }),
        })
    }

    /// Current rates, fetching if the cached table has expired.
    ///
    /// Never fails: errors are logged and defaults are served.
    #[instrument(skip(self))]
    pub async fn current(&self) -> RateTable {
        if self.inner.offline {
            debug!("offline mode, using default rates");
            return RateTable::default();
        }

        if let Some(table) = self.inner.cache.get(CACHE_KEY).await {
            debug!("Cache hit for rates");
            return table;
        }

        let table = match self.fetch().await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "rate fetch failed, using defaults");
                RateTable::default()
            }
        };
        self.inner.cache.insert(CACHE_KEY, table.clone()).await;
        table
    }

    /// Fetch rates from the API, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API returns a non-success
    /// status or an unreadable body.
    pub async fn fetch(&self) -> Result<RateTable, RatesError> {
        let response = self.inner.client.get(self.inner.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RatesError::Api(status.as_u16()));
        }

        let body: PriceResponse = response.json().await?;
        Ok(RateTable::from_response(&body))
    }

    /// Drop the cached table so the next call refetches.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_defaults() {
        let table = RateTable::default();
        assert_eq!(table.eur_per_unit(Currency::BTC), Decimal::from(45_000));
        assert_eq!(table.eur_per_unit(Currency::XMR), Decimal::from(180));
        assert_eq!(table.eur_per_unit(Currency::EUR), Decimal::ONE);
    }

    #[test]
    fn test_partial_response_falls_back_per_currency() {
        let body: PriceResponse = serde_json::from_str(
            r#"{"bitcoin": {"eur": 50000.5}, "monero": {"eur": 0}, "tether": {}}"#,
        )
        .unwrap();
        let table = RateTable::from_response(&body);

        assert_eq!(table.eur_per_unit(Currency::BTC), Decimal::new(500_005, 1));
        assert_eq!(table.eur_per_unit(Currency::XMR), Decimal::from(180));
        assert_eq!(table.eur_per_unit(Currency::USDT), Decimal::ONE);
        assert_eq!(table.eur_per_unit(Currency::ETH), Decimal::from(2_800));
    }

    #[test]
    fn test_convert_rounds_to_six_places() {
        let table = RateTable::default();
        assert_eq!(
            table.convert_eur_to_crypto(Decimal::from(100), Currency::XMR),
            Decimal::new(555_556, 6)
        );
        assert_eq!(
            table.convert(Decimal::new(5, 2), Currency::XMR, Currency::BTC),
            Some(Decimal::new(200, 6))
        );
        assert_eq!(
            table.convert(Decimal::ONE, Currency::LTC, Currency::LTC),
            Some(Decimal::ONE)
        );
    }

    #[test]
    fn test_convert_overflow_is_none() {
        let table = RateTable::default();
        assert!(table.convert(Decimal::MAX, Currency::XMR, Currency::BTC).is_none());

        let body: PriceResponse =
            serde_json::from_str(r#"{"tether": {"eur": 0.0001}}"#).unwrap();
        let cheap = RateTable::from_response(&body);
        assert!(cheap.convert(Decimal::MAX, Currency::EUR, Currency::USDT).is_none());
        assert_eq!(
            table.convert(Decimal::MAX, Currency::XMR, Currency::XMR),
            Some(Decimal::MAX)
        );
    }

    #[tokio::test]
    async fn test_offline_serves_defaults() {
        let config = RatesConfig {
            offline: true,
            ..RatesConfig::default()
        };
        let client = RatesClient::new(&config).unwrap();
        assert_eq!(client.current().await, RateTable::default());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        let config = RatesConfig {
            url: Url::parse("http://127.0.0.1:9/rates").unwrap(),
            timeout: Duration::from_millis(500),
            ..RatesConfig::default()
        };
        let client = RatesClient::new(&config).unwrap();

        assert!(client.fetch().await.is_err());
        assert_eq!(client.current().await, RateTable::default());
    }
}
