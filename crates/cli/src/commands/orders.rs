//! Order commands.

use chrono::Utc;
use clap::Subcommand;
use tracing::{info, warn};

use anonshop_core::{OrderId, OrderStatus};
use anonshop_storefront::db::OrderRepository;
use anonshop_storefront::error::AppError;
use anonshop_storefront::models::Order;
use anonshop_storefront::services::update_order_status;
use anonshop_storefront::state::AppState;

use super::{CliError, require_session};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List orders (only those sold by the active session with --mine)
    List {
        #[arg(long)]
        mine: bool,
    },
    /// Show one order
    Show { id: OrderId },
    /// Move an order to the next status and notify its vendor
    Status {
        id: OrderId,
        /// pending, paid, confirmed, delivered or completed
        status: OrderStatus,
    },
    /// Reveal the delivery address; it is wiped after the redaction delay
    Reveal {
        id: OrderId,
        /// Stay until the address has been wiped
        #[arg(long)]
        wait: bool,
    },
    /// Order counts per status
    Counts,
}

fn log_order(order: &Order) {
    let overdue = order.is_overdue(Utc::now());
    info!(
        id = %order.id,
        vendor = %order.vendor_pseudonym,
        customer_code = %order.customer_code,
        status = %order.status,
        total = %order.total_amount,
        currency = %order.currency,
        items = order.total_items(),
        overdue,
        "Order"
    );
}

/// Run an order command.
///
/// # Errors
///
/// Returns an error if the order doesn't exist, the transition is invalid,
/// or storage fails.
pub async fn run(state: &AppState, action: OrdersAction) -> Result<(), CliError> {
    let orders = OrderRepository::with_payment_window(state.storage(), state.payment_window());

    match action {
        OrdersAction::List { mine } => {
            let list = if mine {
                orders.by_vendor(&require_session(state)?)?
            } else {
                orders.list()?
            };
            info!(count = list.len(), "Orders");
            list.iter().for_each(log_order);
        }
        OrdersAction::Show { id } => {
            let order = orders
                .get(&id)?
                .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
            log_order(&order);
            for item in &order.items {
                info!(title = %item.title, quantity = item.quantity, price = %item.price, "Item");
            }
            if order.delivery_address.is_visible {
                info!(
                    name = %order.delivery_address.name,
                    street = %order.delivery_address.street,
                    city = %order.delivery_address.city,
                    postal_code = %order.delivery_address.postal_code,
                    country = %order.delivery_address.country,
                    "Delivery address"
                );
            } else {
                info!("Delivery address hidden; use `orders reveal` to view it once");
            }
        }
        OrdersAction::Status { id, status } => {
            let order = update_order_status(state.storage(), &id, status)?;
            log_order(&order);
        }
        OrdersAction::Reveal { id, wait } => {
            let revealed = state
                .redaction()
                .reveal(&id)?
                .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

            let address = &revealed.order.delivery_address;
            info!(
                name = %address.name,
                street = %address.street,
                city = %address.city,
                postal_code = %address.postal_code,
                country = %address.country,
                "Delivery address"
            );

            match revealed.redaction {
                Some(handle) if wait => {
                    info!(
                        delay_secs = state.config().redaction_delay.as_secs(),
                        "Waiting for redaction"
                    );
                    if let Err(e) = handle.await {
                        warn!(error = %e, "Redaction task did not finish");
                    } else {
                        info!(id = %id, "Delivery address redacted");
                    }
                }
                Some(_) => warn!(
                    "Redaction is scheduled in this process only; pass --wait to keep it alive"
                ),
                None => info!("Address was already revealed; no new redaction scheduled"),
            }
        }
        OrdersAction::Counts => {
            let counts = orders.status_counts()?;
            info!(
                total = counts.total,
                pending = counts.pending,
                paid = counts.paid,
                confirmed = counts.confirmed,
                delivered = counts.delivered,
                completed = counts.completed,
                "Order counts"
            );
        }
    }
    Ok(())
}
