//! Stateful workflows layered over the repositories.
//!
//! - [`checkout`] - step-by-step checkout producing one order per vendor
//! - [`redaction`] - timed wiping of viewed delivery addresses
//! - [`rates`] - cached EUR exchange rates with offline defaults
//! - [`captcha`] - throttled human-verification challenge
//! - [`marketplace`] - front-page vendor listing
//! - [`notifications`] - order messages for vendors with an active bot

pub mod captcha;
pub mod checkout;
pub mod marketplace;
pub mod notifications;
pub mod rates;
pub mod redaction;

pub use captcha::{CaptchaChallenge, CaptchaError};
pub use checkout::{CheckoutError, CheckoutReceipt, CheckoutStep, CheckoutWizard, PaymentDetails};
pub use marketplace::visible_vendors;
pub use notifications::{Notification, OrderNotifier, update_order_status};
pub use rates::{RateTable, RatesClient, RatesError};
pub use redaction::{RedactionScheduler, Revealed};
