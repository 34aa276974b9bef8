//! Unified error handling.
//!
//! Provides a unified `AppError` type for callers that drive several layers
//! at once (the CLI, integration tests). Library functions return their own
//! layer's error; `?` lifts them into `AppError`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::services::{CaptchaError, CheckoutError, RatesError};
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Checkout step failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Captcha answer was refused.
    #[error("Captcha error: {0}")]
    Captcha(#[from] CaptchaError),

    /// Exchange rate client failed.
    #[error("Rates error: {0}")]
    Rates(#[from] RatesError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No session is active.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the error was caused by user input rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        match self {
            Self::Repository(
                RepositoryError::Validation(_)
                | RepositoryError::InvalidPseudonym(_)
                | RepositoryError::NotFound(_)
                | RepositoryError::Conflict(_)
                | RepositoryError::Overflow(_)
                | RepositoryError::InvalidTransition { .. },
            )
            | Self::Checkout(
                CheckoutError::EmptyCart
                | CheckoutError::WrongStep { .. }
                | CheckoutError::UnsupportedCurrency(_)
                | CheckoutError::MissingAddressFields(_)
                | CheckoutError::MissingTxHash
                | CheckoutError::AmountOverflow,
            )
            | Self::Captcha(_)
            | Self::NotFound(_)
            | Self::Unauthorized(_)
            | Self::BadRequest(_) => true,
            Self::Config(_)
            | Self::Storage(_)
            | Self::Repository(RepositoryError::Storage(_))
            | Self::Checkout(CheckoutError::Repository(_))
            | Self::Rates(_) => false,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_classified() {
        let err = AppError::from(RepositoryError::Validation("title is required".to_owned()));
        assert!(err.is_user_error());
        assert!(AppError::from(CheckoutError::EmptyCart).is_user_error());
        assert!(AppError::from(CheckoutError::AmountOverflow).is_user_error());

        let err = AppError::from(StorageError::Poisoned);
        assert!(!err.is_user_error());
        let err = AppError::from(RepositoryError::Storage(StorageError::Poisoned));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_message_passthrough() {
        let err = AppError::from(RepositoryError::NotFound("order order-1".to_owned()));
        assert_eq!(err.to_string(), "not found: order order-1");
    }
}
