//! Payout wallet records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use anonshop_core::Pseudonym;

/// The marketplace's own receiving wallets, configured by the admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoWallets {
    pub btc_address: String,
    pub xmr_address: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A vendor's USDT payout wallet as mirrored into the admin vendor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorWalletRecord {
    pub pseudonym: Pseudonym,
    pub wallet_address: String,
    pub last_updated: DateTime<Utc>,
}
