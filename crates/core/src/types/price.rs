//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., whole XMR, not piconero).
    pub amount: Decimal,
    /// Currency the amount is denominated in.
    pub currency: Currency,
}

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, PriceError> {
        if amount < Decimal::ZERO {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self { amount, currency })
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency: self.currency,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.normalize(), self.currency)
    }
}

/// Currencies accepted by the storefront.
///
/// Products are listed in crypto; `EUR` is the reference currency for
/// exchange rates and the vendor license fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    XMR,
    BTC,
    ETH,
    LTC,
    USDT,
    EUR,
}

/// Error returned when a currency code is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency: {0}")]
pub struct CurrencyParseError(pub String);

impl Currency {
    /// Crypto currencies a buyer can pay with at checkout.
    pub const PAYABLE: [Self; 5] = [Self::XMR, Self::BTC, Self::ETH, Self::LTC, Self::USDT];

    /// Upper-case ticker code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::XMR => "XMR",
            Self::BTC => "BTC",
            Self::ETH => "ETH",
            Self::LTC => "LTC",
            Self::USDT => "USDT",
            Self::EUR => "EUR",
        }
    }

    /// Whether the currency is a crypto asset (everything except EUR).
    #[must_use]
    pub const fn is_crypto(self) -> bool {
        !matches!(self, Self::EUR)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = CurrencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "XMR" => Ok(Self::XMR),
            "BTC" => Ok(Self::BTC),
            "ETH" => Ok(Self::ETH),
            "LTC" => Ok(Self::LTC),
            "USDT" => Ok(Self::USDT),
            "EUR" => Ok(Self::EUR),
            _ => Err(CurrencyParseError(s.to_owned())),
        }
    }
}
