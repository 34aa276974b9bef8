//! Vendor-side records: registration codes, stats, banners and messages.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use anonshop_core::{ContactMethod, Currency, MessageId, Pseudonym, StatId, StatKind, VendorCodeId};

/// A one-time vendor registration code issued by the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCode {
    pub id: VendorCodeId,
    /// `VND-` followed by eight upper-case alphanumerics.
    pub code: String,
    pub is_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_by: Option<Pseudonym>,
    pub created_at: DateTime<Utc>,
}

/// An entry in a vendor's activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorStat {
    pub id: StatId,
    #[serde(rename = "type")]
    pub kind: StatKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    pub timestamp: DateTime<Utc>,
}

/// Input for recording a vendor stat.
#[derive(Debug, Clone)]
pub struct NewVendorStat {
    pub kind: StatKind,
    pub description: String,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
}

/// How a vendor's shop is presented in the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorBanner {
    pub pseudonym: Pseudonym,
    #[serde(default)]
    pub banner_image: Option<String>,
    pub is_visible: bool,
    #[serde(default)]
    pub invisible_mode: bool,
    #[serde(default)]
    pub shop_name: String,
}

impl VendorBanner {
    /// The banner a vendor has before customising anything.
    #[must_use]
    pub const fn default_for(pseudonym: Pseudonym) -> Self {
        Self {
            pseudonym,
            banner_image: None,
            is_visible: true,
            invisible_mode: false,
            shop_name: String::new(),
        }
    }

    /// Whether the vendor should be listed in the marketplace.
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        self.is_visible && !self.invisible_mode
    }
}

/// A buyer's message to a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMessage {
    pub id: MessageId,
    pub contact_method: ContactMethod,
    pub contact_value: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Input for sending a message to a vendor.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub contact_method: ContactMethod,
    pub contact_value: String,
    pub message: String,
}
