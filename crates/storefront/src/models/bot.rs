//! Messenger bot configuration for vendors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-vendor notification bot settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBotConfig {
    pub session_id: String,
    pub bot_active: bool,
    pub encryption_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pgp_public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

/// Per-vendor Telegram bot settings for managing the shop from a group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramBotConfig {
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub group_id: String,
    pub updated_at: DateTime<Utc>,
}
