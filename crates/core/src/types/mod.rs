//! Core types for anonshop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod price;
pub mod pseudonym;
pub mod status;

pub use address::{DeliveryAddress, REDACTED_PLACEHOLDER};
pub use id::*;
pub use price::{Currency, CurrencyParseError, Price, PriceError};
pub use pseudonym::{Pseudonym, PseudonymError};
pub use status::*;
