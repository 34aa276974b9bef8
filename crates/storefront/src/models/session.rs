//! Session-related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use anonshop_core::Pseudonym;

/// The active pseudonymous session for this storage profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub pseudonym: Pseudonym,
    pub created_at: DateTime<Utc>,
}
