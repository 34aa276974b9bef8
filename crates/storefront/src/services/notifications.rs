//! Vendor order notifications over the Session messenger bot.
//!
//! Notifications are composed here and emitted on the [`NOTIFY_TARGET`]
//! tracing target. Whatever consumes that target is responsible for handing
//! the body to the messenger. A vendor without an active bot gets nothing.
//!
//! When the vendor enabled encryption, the body is the JSON payload instead of
//! the readable text, so the sender can encrypt it as one blob.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use anonshop_core::{OrderId, OrderStatus, Pseudonym};

use crate::db::{BotConfigRepository, OrderRepository, RepositoryError};
use crate::models::{Order, OrderItem, SessionBotConfig};
use crate::storage::{Storage, StorageError};

/// Tracing target every notification is emitted on.
pub const NOTIFY_TARGET: &str = "anonshop::notify";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// A message handed to a vendor's bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub vendor: Pseudonym,
    pub session_id: String,
    /// The vendor asked for encrypted delivery; `body` is then JSON.
    pub encrypted: bool,
    pub body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewOrderPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    order_id: &'a OrderId,
    shop: &'a Pseudonym,
    customer: &'a str,
    products: &'a [OrderItem],
    total: String,
    timestamp: DateTime<Utc>,
    status: OrderStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    order_id: &'a OrderId,
    shop: &'a Pseudonym,
    status: OrderStatus,
    timestamp: DateTime<Utc>,
}

/// Composes and emits order notifications for vendors.
pub struct OrderNotifier<'a> {
    storage: &'a Storage,
}

impl<'a> OrderNotifier<'a> {
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Tell the vendor about a freshly placed order.
    ///
    /// Returns the emitted notification, or `None` if the vendor's bot is
    /// not active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the bot settings can't be read
    /// or its activity stamp can't be written.
    pub fn new_order(&self, order: &Order) -> Result<Option<Notification>, RepositoryError> {
        let Some(bot) = self.active_bot(&order.vendor_pseudonym)? else {
            return Ok(None);
        };

        let body = if bot.encryption_enabled {
            to_json(&NewOrderPayload {
                kind: "NEW_ORDER",
                order_id: &order.id,
                shop: &order.vendor_pseudonym,
                customer: &order.customer_code,
                products: &order.items,
                total: format!("{} {}", order.total_amount, order.currency),
                timestamp: order.created_at,
                status: order.status,
            })?
        } else {
            new_order_text(order)
        };

        self.emit(&order.vendor_pseudonym, &bot, body).map(Some)
    }

    /// Tell the vendor an order moved to a new status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the bot settings can't be read
    /// or its activity stamp can't be written.
    pub fn status_changed(&self, order: &Order) -> Result<Option<Notification>, RepositoryError> {
        let Some(bot) = self.active_bot(&order.vendor_pseudonym)? else {
            return Ok(None);
        };

        let now = Utc::now();
        let body = if bot.encryption_enabled {
            to_json(&StatusPayload {
                kind: "STATUS_CHANGE",
                order_id: &order.id,
                shop: &order.vendor_pseudonym,
                status: order.status,
                timestamp: now,
            })?
        } else {
            format!(
                "ORDER STATUS UPDATED\n\nOrder: #{}\nNew status: {}\nTime: {}\n",
                order.id,
                order.status,
                now.format(TIME_FORMAT)
            )
        };

        self.emit(&order.vendor_pseudonym, &bot, body).map(Some)
    }

    /// Like [`Self::new_order`], logging failures instead of returning them.
    pub fn new_order_or_warn(&self, order: &Order) {
        if let Err(e) = self.new_order(order) {
            warn!(order_id = %order.id, error = %e, "order notification failed");
        }
    }

    fn active_bot(&self, vendor: &Pseudonym) -> Result<Option<SessionBotConfig>, RepositoryError> {
        let bot = BotConfigRepository::new(self.storage)
            .get(vendor)?
            .filter(|bot| bot.bot_active);
        if bot.is_none() {
            debug!(vendor = %vendor, "no active bot, skipping notification");
        }
        Ok(bot)
    }

    fn emit(
        &self,
        vendor: &Pseudonym,
        bot: &SessionBotConfig,
        body: String,
    ) -> Result<Notification, RepositoryError> {
        info!(
            target: NOTIFY_TARGET,
            vendor = %vendor,
            session_id = %bot.session_id,
            encrypted = bot.encryption_enabled,
            "{body}"
        );
        BotConfigRepository::new(self.storage).touch(vendor)?;

        Ok(Notification {
            vendor: vendor.clone(),
            session_id: bot.session_id.clone(),
            encrypted: bot.encryption_enabled,
            body,
        })
    }
}

fn to_json(payload: &impl Serialize) -> Result<String, RepositoryError> {
    Ok(serde_json::to_string(payload).map_err(StorageError::from)?)
}

fn new_order_text(order: &Order) -> String {
    let products: Vec<String> = order
        .items
        .iter()
        .map(|item| {
            format!(
                "- {} ({}x {} {})",
                item.title, item.quantity, item.price, order.currency
            )
        })
        .collect();

    format!(
        "NEW ORDER #{id}\n\nShop: {shop}\nCustomer: {customer}\nTotal: {total} {currency}\n\n\
         Products:\n{products}\n\nTime: {time}\nStatus: {status}\n",
        id = order.id,
        shop = order.vendor_pseudonym,
        customer = order.customer_code,
        total = order.total_amount,
        currency = order.currency,
        products = products.join("\n"),
        time = order.created_at.format(TIME_FORMAT),
        status = order.status,
    )
}

/// Move an order to `status` and notify its vendor.
///
/// A failed notification is logged; the status change stands.
///
/// # Errors
///
/// Returns the same errors as [`OrderRepository::update_status`].
pub fn update_order_status(
    storage: &Storage,
    id: &OrderId,
    status: OrderStatus,
) -> Result<Order, RepositoryError> {
    let order = OrderRepository::new(storage).update_status(id, status)?;
    if let Err(e) = OrderNotifier::new(storage).status_changed(&order) {
        warn!(order_id = %id, error = %e, "status notification failed");
    }
    Ok(order)
}
