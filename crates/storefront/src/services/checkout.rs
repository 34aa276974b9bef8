//! Checkout wizard.
//!
//! A linear state machine driven one step at a time by the caller:
//!
//! ```text
//! Review -> CurrencySelection -> Address -> Payment -> Confirmed
//! ```
//!
//! Currency selection is optional (XMR is the default). Confirmation takes a
//! self-attested transaction hash, which is never verified, and records one
//! paid order per vendor in the cart.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use anonshop_core::{Currency, CustomerId, DeliveryAddress, OrderStatus, Pseudonym, StatKind};

use super::notifications::OrderNotifier;
use super::rates::RateTable;
use crate::db::{
    CartRepository, OrderRepository, RepositoryError, VendorStatsRepository, WalletRepository,
};
use crate::models::{CartItem, NewOrder, NewVendorStat, Order, OrderItem};
use crate::random::{LOWER_ALNUM, UPPER_ALNUM, random_string};
use crate::storage::Storage;

const HEX: &[u8] = b"0123456789abcdef";

/// Errors raised while moving through checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout needs at least one cart line.
    #[error("cart is empty")]
    EmptyCart,

    /// The action isn't available at the current step.
    #[error("cannot {action} during {step}")]
    WrongStep {
        step: CheckoutStep,
        action: &'static str,
    },

    /// Only the crypto currencies in [`Currency::PAYABLE`] can be paid with.
    #[error("unsupported payment currency: {0}")]
    UnsupportedCurrency(Currency),

    /// One or more delivery address fields were blank.
    #[error("missing address fields: {}", .0.join(", "))]
    MissingAddressFields(Vec<&'static str>),

    /// No transaction hash was entered.
    #[error("transaction hash is required")]
    MissingTxHash,

    /// The amount due is too large to represent.
    #[error("order total is too large")]
    AmountOverflow,

    /// Persisting checkout results failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Wizard steps in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Review,
    CurrencySelection,
    Address,
    Payment,
    Confirmed,
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Review => write!(f, "review"),
            Self::CurrencySelection => write!(f, "currency selection"),
            Self::Address => write!(f, "address entry"),
            Self::Payment => write!(f, "payment"),
            Self::Confirmed => write!(f, "confirmation"),
        }
    }
}

/// What the buyer is asked to pay, shown at the payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub currency: Currency,
    /// Cart total converted into `currency`.
    pub amount: Decimal,
    pub payment_address: String,
}

/// Result of a confirmed checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub customer_id: CustomerId,
    /// `CUST-` followed by ten upper-case alphanumerics.
    pub customer_code: String,
    pub orders: Vec<Order>,
}

/// Checkout session over the current cart.
pub struct CheckoutWizard<'a> {
    storage: &'a Storage,
    payment_window: Duration,
    step: CheckoutStep,
    currency: Currency,
    address: Option<DeliveryAddress>,
    payment: Option<PaymentDetails>,
    rates: RateTable,
}

impl<'a> CheckoutWizard<'a> {
    /// Start checkout at the review step.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to check out.
    pub fn begin(storage: &'a Storage, payment_window: Duration) -> Result<Self, CheckoutError> {
        if CartRepository::new(storage).items()?.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            storage,
            payment_window,
            step: CheckoutStep::Review,
            currency: Currency::default(),
            address: None,
            payment: None,
            rates: RateTable::default(),
        })
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Currency selected so far (XMR until changed).
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Payment details, available from the payment step on.
    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentDetails> {
        self.payment.as_ref()
    }

    /// The cart lines being checked out.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the cart cannot be read.
    pub fn items(&self) -> Result<Vec<CartItem>, CheckoutError> {
        Ok(CartRepository::new(self.storage).items()?)
    }

    fn expect_step(&self, step: CheckoutStep, action: &'static str) -> Result<(), CheckoutError> {
        if self.step == step {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep {
                step: self.step,
                action,
            })
        }
    }

    /// Leave review for currency selection.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStep` unless at review.
    pub fn proceed_to_currency(&mut self) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Review, "choose a currency")?;
        self.step = CheckoutStep::CurrencySelection;
        Ok(())
    }

    /// Pick the payment currency and move on to the address form.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStep` unless at currency selection, or
    /// `CheckoutError::UnsupportedCurrency` for a non-crypto currency.
    pub fn select_currency(&mut self, currency: Currency) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::CurrencySelection, "select a currency")?;
        if !Currency::PAYABLE.contains(&currency) {
            return Err(CheckoutError::UnsupportedCurrency(currency));
        }
        self.currency = currency;
        self.step = CheckoutStep::Address;
        Ok(())
    }

    /// Keep the default currency and go straight to the address form.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStep` unless at review or currency selection.
    pub fn skip_currency(&mut self) -> Result<(), CheckoutError> {
        match self.step {
            CheckoutStep::Review | CheckoutStep::CurrencySelection => {
                self.step = CheckoutStep::Address;
                Ok(())
            }
            step => Err(CheckoutError::WrongStep {
                step,
                action: "skip currency selection",
            }),
        }
    }

    /// Submit the delivery address and compute what to pay.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStep` unless at address entry,
    /// `CheckoutError::MissingAddressFields` if any field is blank,
    /// `CheckoutError::AmountOverflow` if the total can't be represented, or
    /// `CheckoutError::EmptyCart` if the cart was emptied meanwhile.
    #[instrument(skip(self, address, rates), fields(currency = %self.currency))]
    pub fn submit_address(
        &mut self,
        address: DeliveryAddress,
        rates: &RateTable,
    ) -> Result<&PaymentDetails, CheckoutError> {
        self.expect_step(CheckoutStep::Address, "submit an address")?;

        let missing = address.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingAddressFields(missing));
        }

        let items = self.items()?;
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let amount = converted_total(&items, rates, self.currency)?;
        let payment_address = self.payment_address()?;

        self.address = Some(address);
        self.rates = rates.clone();
        self.step = CheckoutStep::Payment;
        Ok(&*self.payment.insert(PaymentDetails {
            currency: self.currency,
            amount,
            payment_address,
        }))
    }

    /// The configured admin wallet for this currency, or a generated one.
    fn payment_address(&self) -> Result<String, CheckoutError> {
        let wallets = WalletRepository::new(self.storage).admin_wallets()?;
        let address = match self.currency {
            Currency::BTC if !wallets.btc_address.is_empty() => wallets.btc_address,
            Currency::BTC => format!("bc1q{}", random_string(LOWER_ALNUM, 38)),
            Currency::ETH | Currency::USDT => format!("0x{}", random_string(HEX, 40)),
            Currency::LTC => format!("ltc1q{}", random_string(LOWER_ALNUM, 38)),
            Currency::XMR | Currency::EUR => format!("4{}", random_string(LOWER_ALNUM, 94)),
        };
        Ok(address)
    }

    /// Confirm payment with a transaction hash and record the orders.
    ///
    /// One order is recorded per vendor with status `paid`, all in a single
    /// write, and the cart is cleared. Only then does each vendor get a
    /// `sale` entry in their stats feed and a bot notification; a failure in
    /// those is logged and doesn't undo the checkout.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStep` unless at payment,
    /// `CheckoutError::MissingTxHash` if the hash is blank,
    /// `CheckoutError::AmountOverflow` if a vendor total can't be represented,
    /// or `CheckoutError::EmptyCart` if the cart was emptied meanwhile. If
    /// storing the orders fails nothing is recorded and the cart is kept.
    #[instrument(skip(self, tx_hash))]
    pub fn confirm_payment(&mut self, tx_hash: &str) -> Result<CheckoutReceipt, CheckoutError> {
        self.expect_step(CheckoutStep::Payment, "confirm payment")?;

        let tx_hash = tx_hash.trim();
        if tx_hash.is_empty() {
            return Err(CheckoutError::MissingTxHash);
        }

        let (Some(address), Some(payment)) = (self.address.clone(), self.payment.clone()) else {
            return Err(CheckoutError::WrongStep {
                step: self.step,
                action: "confirm payment",
            });
        };

        let cart = CartRepository::new(self.storage);
        let items = cart.items()?;
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut by_vendor: BTreeMap<Pseudonym, Vec<CartItem>> = BTreeMap::new();
        for item in items {
            by_vendor
                .entry(item.seller_pseudonym.clone())
                .or_default()
                .push(item);
        }

        let customer_id = CustomerId::generate();
        let customer_code = format!("CUST-{}", random_string(UPPER_ALNUM, 10));
        let now = Utc::now();

        let mut new_orders = Vec::with_capacity(by_vendor.len());
        for (vendor, lines) in by_vendor {
            new_orders.push(NewOrder {
                customer_id: customer_id.clone(),
                vendor_pseudonym: vendor,
                customer_code: customer_code.clone(),
                total_amount: converted_total(&lines, &self.rates, payment.currency)?,
                items: lines.iter().map(OrderItem::from).collect(),
                currency: payment.currency,
                status: OrderStatus::Paid,
                payment_address: payment.payment_address.clone(),
                tx_hash: Some(tx_hash.to_owned()),
                delivery_address: address.clone(),
                paid_at: Some(now),
            });
        }

        let orders = OrderRepository::with_payment_window(self.storage, self.payment_window)
            .create_many(new_orders)?;
        self.step = CheckoutStep::Confirmed;
        if let Err(e) = cart.clear() {
            warn!(error = %e, "orders recorded but the cart could not be cleared");
        }

        let stats = VendorStatsRepository::new(self.storage);
        let notifier = OrderNotifier::new(self.storage);
        for order in &orders {
            let sale = NewVendorStat {
                kind: StatKind::Sale,
                description: format!("Order {customer_code}"),
                amount: Some(order.total_amount),
                currency: Some(order.currency),
            };
            if let Err(e) = stats.add(&order.vendor_pseudonym, sale) {
                warn!(vendor = %order.vendor_pseudonym, error = %e, "failed to record sale stat");
            }
            notifier.new_order_or_warn(order);
        }

        info!(orders = orders.len(), %customer_code, "checkout confirmed");
        Ok(CheckoutReceipt {
            customer_id,
            customer_code,
            orders,
        })
    }

    /// Return to the previous step.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::WrongStep` once checkout is confirmed.
    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.step = match self.step {
            CheckoutStep::Review | CheckoutStep::CurrencySelection => CheckoutStep::Review,
            CheckoutStep::Address => CheckoutStep::CurrencySelection,
            CheckoutStep::Payment => {
                self.payment = None;
                CheckoutStep::Address
            }
            CheckoutStep::Confirmed => {
                return Err(CheckoutError::WrongStep {
                    step: CheckoutStep::Confirmed,
                    action: "go back",
                });
            }
        };
        Ok(self.step)
    }
}

/// Sum of the lines' totals converted into `currency`.
fn converted_total(
    lines: &[CartItem],
    rates: &RateTable,
    currency: Currency,
) -> Result<Decimal, CheckoutError> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |total, item| {
            let line = item.line_total()?;
            total.checked_add(rates.convert(line, item.currency, currency)?)
        })
        .ok_or(CheckoutError::AmountOverflow)
}
