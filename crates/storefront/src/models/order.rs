//! Orders recorded at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use anonshop_core::{
    Currency, CustomerId, DeliveryAddress, OrderId, OrderStatus, ProductId, Pseudonym,
};

use super::CartItem;

/// A purchased line, copied from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            title: item.title.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// An order placed with a single vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub vendor_pseudonym: Pseudonym,
    /// Token shown to the buyer for out-of-band correlation with the vendor.
    pub customer_code: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub status: OrderStatus,
    pub payment_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub delivery_address: DeliveryAddress,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub payment_deadline: DateTime<Utc>,
}

impl Order {
    /// Number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the payment deadline has passed without payment.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_paid() && now > self.payment_deadline
    }
}

/// Input for recording an order. The repository assigns `id`, `created_at`
/// and `payment_deadline`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub vendor_pseudonym: Pseudonym,
    pub customer_code: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub status: OrderStatus,
    pub payment_address: String,
    pub tx_hash: Option<String>,
    pub delivery_address: DeliveryAddress,
    pub paid_at: Option<DateTime<Utc>>,
}
