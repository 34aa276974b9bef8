//! Delayed wiping of viewed delivery addresses.
//!
//! Revealing an address starts a one-shot timer; when it fires the five
//! address fields are overwritten with the redaction placeholder. Timers are
//! not persisted: one that is still pending when the process exits never
//! fires, and the address stays readable.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use anonshop_core::OrderId;

use crate::db::{OrderRepository, RepositoryError};
use crate::models::Order;
use crate::storage::Storage;

/// Schedules address redaction after a reveal.
#[derive(Debug, Clone)]
pub struct RedactionScheduler {
    storage: Storage,
    delay: Duration,
}

/// A revealed order plus its pending redaction, if one was scheduled.
#[derive(Debug)]
pub struct Revealed {
    pub order: Order,
    /// `None` when the address had already been revealed earlier.
    pub redaction: Option<JoinHandle<()>>,
}

impl RedactionScheduler {
    /// Create a scheduler that wipes addresses `delay` after their first view.
    #[must_use]
    pub const fn new(storage: Storage, delay: Duration) -> Self {
        Self { storage, delay }
    }

    /// Reveal the delivery address of `id` and schedule its redaction.
    ///
    /// Returns `None` if the order doesn't exist. Revealing an address that
    /// is already visible schedules nothing. Must be called inside a Tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn reveal(&self, id: &OrderId) -> Result<Option<Revealed>, RepositoryError> {
        let orders = OrderRepository::new(&self.storage);
        let already_visible = orders
            .get(id)?
            .is_some_and(|o| o.delivery_address.is_visible);

        let Some(order) = orders.reveal_delivery_address(id)? else {
            return Ok(None);
        };

        if already_visible {
            return Ok(Some(Revealed {
                order,
                redaction: None,
            }));
        }

        let storage = self.storage.clone();
        let delay = self.delay;
        let order_id = id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = OrderRepository::new(&storage).redact_delivery_address(&order_id) {
                error!(order_id = %order_id, error = %e, "address redaction failed");
            }
        });

        info!(order_id = %id, delay_secs = delay.as_secs(), "address redaction scheduled");
        Ok(Some(Revealed {
            order,
            redaction: Some(handle),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use anonshop_core::{
        Currency, CustomerId, DeliveryAddress, OrderStatus, Pseudonym, REDACTED_PLACEHOLDER,
    };

    use super::*;
    use crate::models::NewOrder;

    fn seed_order(storage: &Storage) -> Order {
        OrderRepository::new(storage)
            .create(NewOrder {
                customer_id: CustomerId::generate(),
                vendor_pseudonym: Pseudonym::parse("crypto_dealer").unwrap(),
                customer_code: "CUST-0123456789".to_owned(),
                items: Vec::new(),
                total_amount: Decimal::new(5, 2),
                currency: Currency::XMR,
                status: OrderStatus::Paid,
                payment_address: "4abc".to_owned(),
                tx_hash: Some("deadbeef".to_owned()),
                delivery_address: DeliveryAddress::new("Jane", "Street 1", "Berlin", "10115", "DE"),
                paid_at: None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_reveal_then_redact() {
        let storage = Storage::in_memory();
        let order = seed_order(&storage);
        let scheduler = RedactionScheduler::new(storage.clone(), Duration::from_millis(20));

        let revealed = scheduler.reveal(&order.id).unwrap().unwrap();
        assert!(revealed.order.delivery_address.is_visible);
        assert_eq!(revealed.order.delivery_address.name, "Jane");

        revealed.redaction.unwrap().await.unwrap();

        let stored = OrderRepository::new(&storage).get(&order.id).unwrap().unwrap();
        assert_eq!(stored.delivery_address.name, REDACTED_PLACEHOLDER);
        assert_eq!(stored.delivery_address.country, REDACTED_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_second_reveal_schedules_nothing() {
        let storage = Storage::in_memory();
        let order = seed_order(&storage);
        let scheduler = RedactionScheduler::new(storage, Duration::from_secs(60));

        let first = scheduler.reveal(&order.id).unwrap().unwrap();
        assert!(first.redaction.is_some());
        let second = scheduler.reveal(&order.id).unwrap().unwrap();
        assert!(second.redaction.is_none());
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let scheduler = RedactionScheduler::new(Storage::in_memory(), Duration::from_millis(1));
        assert!(scheduler.reveal(&OrderId::new("missing")).unwrap().is_none());
    }
}
