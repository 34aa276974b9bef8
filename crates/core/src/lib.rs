//! anonshop core - shared types library.
//!
//! This crate provides the domain types used across all anonshop components:
//! - `storefront` - The storage-backed state layer (catalog, cart, orders, checkout)
//! - `cli` - Command-line driver for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, pseudonyms, prices, statuses and addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
