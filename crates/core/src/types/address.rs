//! Delivery address attached to an order.
//!
//! Addresses are shown to the vendor once and then overwritten with
//! [`REDACTED_PLACEHOLDER`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Literal written into every text field of a redacted address.
pub const REDACTED_PLACEHOLDER: &str = "[GELÖSCHT]";

/// A buyer's delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    /// Set once the vendor has revealed the address.
    #[serde(default)]
    pub is_visible: bool,
    /// When the address was first revealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<DateTime<Utc>>,
}

impl DeliveryAddress {
    /// Create a hidden, not-yet-viewed address.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
            is_visible: false,
            viewed_at: None,
        }
    }

    /// Names of the text fields that are empty after trimming.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("street", &self.street),
            ("city", &self.city),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Mark the address as revealed at `now`.
    ///
    /// Returns `false` if it was already visible, in which case nothing changes.
    pub fn reveal(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_visible {
            return false;
        }
        self.is_visible = true;
        self.viewed_at = Some(now);
        true
    }

    /// Overwrite every text field with [`REDACTED_PLACEHOLDER`].
    pub fn redact(&mut self) {
        for field in [
            &mut self.name,
            &mut self.street,
            &mut self.city,
            &mut self.postal_code,
            &mut self.country,
        ] {
            REDACTED_PLACEHOLDER.clone_into(field);
        }
    }

    /// Whether every text field holds the placeholder.
    #[must_use]
    pub fn is_redacted(&self) -> bool {
        [
            &self.name,
            &self.street,
            &self.city,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|field| field.as_str() == REDACTED_PLACEHOLDER)
    }
}
