//! Vendor license applications.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use anonshop_core::{LicenseStatus, Pseudonym};

/// A request to open a vendor shop under `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorLicense {
    /// `LIC-<millis>-<9 lowercase alphanumerics>`.
    pub id: String,
    pub username: Pseudonym,
    /// Fee in EUR at the time of application.
    pub fee: Decimal,
    pub status: LicenseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}
