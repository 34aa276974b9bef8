//! anonshop storefront library.
//!
//! The state layer of a pseudonymous marketplace: every entity is a JSON
//! blob under a well-known key in a local key-value profile, wrapped by one
//! typed repository per entity. Workflows that span repositories (checkout,
//! address redaction, exchange rates, captcha) live in [`services`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod random;
pub mod services;
pub mod state;
pub mod storage;
