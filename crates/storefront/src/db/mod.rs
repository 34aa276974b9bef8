//! Typed repositories over the key-value [`Storage`](crate::storage::Storage).
//!
//! One repository per entity centralizes (de)serialization, validation and
//! the storage key it lives under. Repositories borrow a `Storage` handle and
//! write through synchronously on every mutation.
//!
//! ## Keys
//!
//! See [`keys`] for the full list. Per-vendor data is keyed by
//! `<prefix>_<pseudonym>`.

pub mod banners;
pub mod bot_config;
pub mod cart;
pub mod design;
pub mod licenses;
pub mod messages;
pub mod orders;
pub mod products;
pub mod sessions;
pub mod telegram_bot;
pub mod vendor_codes;
pub mod vendor_stats;
pub mod wallets;

pub use banners::BannerRepository;
pub use bot_config::BotConfigRepository;
pub use cart::CartRepository;
pub use design::DesignRepository;
pub use licenses::LicenseRepository;
pub use messages::MessageRepository;
pub use orders::{OrderRepository, StatusCounts};
pub use products::ProductRepository;
pub use sessions::SessionRepository;
pub use telegram_bot::TelegramBotRepository;
pub use vendor_codes::{CodeCounts, VendorCodeRepository};
pub use vendor_stats::VendorStatsRepository;
pub use wallets::WalletRepository;

use thiserror::Error;

use anonshop_core::{OrderStatus, PseudonymError};

use crate::storage::StorageError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A pseudonym did not pass validation.
    #[error("invalid pseudonym: {0}")]
    InvalidPseudonym(#[from] PseudonymError),

    /// Form input did not pass validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness or state conflict (e.g., username already taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A money amount left the representable range.
    #[error("amount overflow: {0}")]
    Overflow(String),

    /// An order status change would move the lifecycle backwards.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}

impl RepositoryError {
    /// Build a `Validation` error from per-field messages.
    pub(crate) fn validation(errors: &[String]) -> Self {
        Self::Validation(errors.join("; "))
    }
}

/// Storage keys.
pub mod keys {
    use anonshop_core::Pseudonym;

    /// The active session.
    pub const SESSION: &str = "anonshop_session";

    /// The product catalog.
    pub const PRODUCTS: &str = "anonshop_products";

    /// The shopping cart.
    pub const CART: &str = "anonshop_cart";

    /// All recorded orders.
    pub const ORDERS: &str = "anonshop_orders";

    /// Admin receiving wallets.
    pub const ADMIN_WALLETS: &str = "admin_crypto_wallets";

    /// Admin list of vendor payout wallets.
    pub const ADMIN_VENDOR_DATA: &str = "admin_vendor_data";

    /// Vendor registration codes.
    pub const VENDOR_CODES: &str = "vendor_codes";

    /// Marketplace design settings.
    pub const DESIGN: &str = "design_settings";

    /// Vendor license applications.
    pub const LICENSES: &str = "vendor_licenses";

    /// Current vendor license fee.
    pub const LICENSE_FEE: &str = "vendor_license_fee";

    /// A vendor's activity feed.
    #[must_use]
    pub fn vendor_stats(pseudonym: &Pseudonym) -> String {
        format!("vendor_stats_{pseudonym}")
    }

    /// A vendor's banner settings.
    #[must_use]
    pub fn vendor_banner(pseudonym: &Pseudonym) -> String {
        format!("vendor_banner_{pseudonym}")
    }

    /// A vendor's inbox.
    #[must_use]
    pub fn vendor_messages(pseudonym: &Pseudonym) -> String {
        format!("vendor_messages_{pseudonym}")
    }

    /// A vendor's payout wallet address.
    #[must_use]
    pub fn vendor_wallet(pseudonym: &Pseudonym) -> String {
        format!("wallet_{pseudonym}")
    }

    /// A vendor's session bot configuration.
    #[must_use]
    pub fn session_bot(pseudonym: &Pseudonym) -> String {
        format!("session_bot_{pseudonym}")
    }

    /// A vendor's Telegram bot configuration.
    #[must_use]
    pub fn telegram_bot(pseudonym: &Pseudonym) -> String {
        format!("telegram_bot_{pseudonym}")
    }
}
