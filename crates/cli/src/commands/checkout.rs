//! Non-interactive checkout.
//!
//! Walks the checkout wizard from review to confirmation in one go. Every
//! step is logged so a failed run shows where it stopped.

use clap::Args;
use tracing::field::display;
use tracing::info;

use anonshop_core::{Currency, DeliveryAddress};
use anonshop_storefront::services::CheckoutWizard;
use anonshop_storefront::state::AppState;

use super::CliError;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Payment currency (XMR, BTC, ETH, LTC, USDT); XMR when omitted
    #[arg(long)]
    currency: Option<Currency>,

    #[arg(long)]
    name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long)]
    country: String,

    /// Transaction hash of the payment
    #[arg(long)]
    tx_hash: String,
}

/// Check out the current cart.
///
/// # Errors
///
/// Returns an error if the cart is empty, the address is incomplete, the
/// currency isn't payable, or storage fails.
pub async fn run(state: &AppState, args: CheckoutArgs) -> Result<(), CliError> {
    let rates = state.rates().current().await;
    let mut wizard = CheckoutWizard::begin(state.storage(), state.payment_window())?;

    for item in wizard.items()? {
        info!(
            title = %item.title,
            quantity = item.quantity,
            line_total = item.line_total().map(display),
            currency = %item.currency,
            "Reviewing"
        );
    }

    wizard.proceed_to_currency()?;
    match args.currency {
        Some(currency) => wizard.select_currency(currency)?,
        None => wizard.skip_currency()?,
    }
    info!(step = %wizard.step(), currency = %wizard.currency(), "Currency chosen");

    let address = DeliveryAddress::new(
        args.name,
        args.street,
        args.city,
        args.postal_code,
        args.country,
    );
    let payment = wizard.submit_address(address, &rates)?;
    info!(
        amount = %payment.amount,
        currency = %payment.currency,
        address = %payment.payment_address,
        "Payment requested"
    );

    let receipt = wizard.confirm_payment(&args.tx_hash)?;
    info!(
        customer_code = %receipt.customer_code,
        orders = receipt.orders.len(),
        "Checkout confirmed"
    );
    for order in &receipt.orders {
        info!(
            order_id = %order.id,
            vendor = %order.vendor_pseudonym,
            total = %order.total_amount,
            currency = %order.currency,
            "Order placed"
        );
    }
    Ok(())
}
