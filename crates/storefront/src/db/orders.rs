//! Order repository.
//!
//! Orders are append-only apart from status progression and the
//! delivery-address reveal/redact cycle.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use anonshop_core::{OrderId, OrderStatus, Pseudonym};

use super::{RepositoryError, keys};
use crate::models::{NewOrder, Order};
use crate::storage::Storage;

/// Default minutes a buyer has to pay before an order counts as overdue.
pub const DEFAULT_PAYMENT_WINDOW_MINUTES: i64 = 60;

/// Number of orders in each lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub paid: usize,
    pub confirmed: usize,
    pub delivered: usize,
    pub completed: usize,
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    storage: &'a Storage,
    payment_window: Duration,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository with the default payment window.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_payment_window(storage, Duration::minutes(DEFAULT_PAYMENT_WINDOW_MINUTES))
    }

    /// Create a new order repository with a custom payment window.
    #[must_use]
    pub const fn with_payment_window(storage: &'a Storage, payment_window: Duration) -> Self {
        Self {
            storage,
            payment_window,
        }
    }

    /// All orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.storage.load_or_default(keys::ORDERS)?)
    }

    fn save(&self, orders: &[Order]) -> Result<(), RepositoryError> {
        self.storage.save(keys::ORDERS, orders)?;
        Ok(())
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|o| &o.id == id))
    }

    /// Orders placed with one vendor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn by_vendor(&self, pseudonym: &Pseudonym) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|o| &o.vendor_pseudonym == pseudonym)
            .collect())
    }

    fn build(&self, input: NewOrder, now: DateTime<Utc>) -> Order {
        Order {
            id: OrderId::generate(),
            customer_id: input.customer_id,
            vendor_pseudonym: input.vendor_pseudonym,
            customer_code: input.customer_code,
            items: input.items,
            total_amount: input.total_amount,
            currency: input.currency,
            status: input.status,
            payment_address: input.payment_address,
            tx_hash: input.tx_hash,
            delivery_address: input.delivery_address,
            created_at: now,
            paid_at: input.paid_at,
            confirmed_at: None,
            delivered_at: None,
            payment_deadline: now
                .checked_add_signed(self.payment_window)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Record a new order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self, input), fields(vendor = %input.vendor_pseudonym))]
    pub fn create(&self, input: NewOrder) -> Result<Order, RepositoryError> {
        let order = self.build(input, Utc::now());

        let mut orders = self.list()?;
        orders.push(order.clone());
        self.save(&orders)?;

        info!(order_id = %order.id, status = %order.status, "order created");
        Ok(order)
    }

    /// Record several orders with a single write.
    ///
    /// Either all of them are stored or, if the write fails, none are.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub fn create_many(&self, inputs: Vec<NewOrder>) -> Result<Vec<Order>, RepositoryError> {
        let now = Utc::now();
        let created: Vec<Order> = inputs
            .into_iter()
            .map(|input| self.build(input, now))
            .collect();

        let mut orders = self.list()?;
        orders.extend(created.iter().cloned());
        self.save(&orders)?;

        info!(count = created.len(), "orders created");
        Ok(created)
    }

    /// Move an order to `status`, stamping the matching timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist, or
    /// `RepositoryError::InvalidTransition` if `status` is behind the
    /// order's current status.
    #[instrument(skip(self))]
    pub fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut orders = self.list()?;
        let order = orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("order {id}")))?;

        if !order.status.can_advance_to(status) {
            warn!(from = %order.status, to = %status, "rejected backward status change");
            return Err(RepositoryError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        let now = Utc::now();
        order.status = status;
        match status {
            OrderStatus::Paid => {
                order.paid_at.get_or_insert(now);
            }
            OrderStatus::Confirmed => {
                order.confirmed_at.get_or_insert(now);
            }
            OrderStatus::Delivered => {
                order.delivered_at.get_or_insert(now);
            }
            OrderStatus::Pending | OrderStatus::Completed => {}
        }
        let updated = order.clone();

        self.save(&orders)?;
        info!(order_id = %id, status = %status, "order status updated");
        Ok(updated)
    }

    /// Count orders by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn status_counts(&self) -> Result<StatusCounts, RepositoryError> {
        let orders = self.list()?;
        let mut counts = StatusCounts {
            total: orders.len(),
            ..StatusCounts::default()
        };
        for order in &orders {
            match order.status {
                OrderStatus::Pending => counts.pending += 1,
                OrderStatus::Paid => counts.paid += 1,
                OrderStatus::Confirmed => counts.confirmed += 1,
                OrderStatus::Delivered => counts.delivered += 1,
                OrderStatus::Completed => counts.completed += 1,
            }
        }
        Ok(counts)
    }

    /// Mark the delivery address as viewed.
    ///
    /// Returns the order, or `None` if it doesn't exist. An address that is
    /// already visible is left untouched, so `viewed_at` keeps the first view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn reveal_delivery_address(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut orders = self.list()?;
        let Some(order) = orders.iter_mut().find(|o| &o.id == id) else {
            return Ok(None);
        };

        if !order.delivery_address.reveal(Utc::now()) {
            return Ok(Some(order.clone()));
        }
        let revealed = order.clone();

        self.save(&orders)?;
        info!(order_id = %id, "delivery address revealed");
        Ok(Some(revealed))
    }

    /// Overwrite the delivery address text with the redaction placeholder.
    ///
    /// Returns `false` if the order doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn redact_delivery_address(&self, id: &OrderId) -> Result<bool, RepositoryError> {
        let mut orders = self.list()?;
        let Some(order) = orders.iter_mut().find(|o| &o.id == id) else {
            warn!(order_id = %id, "order vanished before redaction");
            return Ok(false);
        };

        order.delivery_address.redact();
        self.save(&orders)?;
        info!(order_id = %id, "delivery address redacted");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use anonshop_core::{Currency, CustomerId, DeliveryAddress, REDACTED_PLACEHOLDER};

    use super::*;

    fn new_order(vendor: &str) -> NewOrder {
        NewOrder {
            customer_id: CustomerId::generate(),
            vendor_pseudonym: Pseudonym::parse(vendor).unwrap(),
            customer_code: "CUST-ABCDEFGHIJ".to_owned(),
            items: Vec::new(),
            total_amount: Decimal::new(5, 2),
            currency: Currency::XMR,
            status: OrderStatus::Pending,
            payment_address: "4abc".to_owned(),
            tx_hash: None,
            delivery_address: DeliveryAddress::new(
                "Jane Doe",
                "Main Street 1",
                "Berlin",
                "10115",
                "Germany",
            ),
            paid_at: None,
        }
    }

    #[test]
    fn test_create_sets_deadline() {
        let storage = Storage::in_memory();
        let repo = OrderRepository::with_payment_window(&storage, Duration::minutes(10));

        let order = repo.create(new_order("crypto_dealer")).unwrap();
        assert_eq!(order.payment_deadline - order.created_at, Duration::minutes(10));
        assert!(!order.is_overdue(order.created_at));
        assert!(order.is_overdue(order.created_at + Duration::minutes(11)));
    }

    #[test]
    fn test_status_moves_forward_only() {
        let storage = Storage::in_memory();
        let repo = OrderRepository::new(&storage);
        let order = repo.create(new_order("crypto_dealer")).unwrap();

        let paid = repo.update_status(&order.id, OrderStatus::Paid).unwrap();
        assert!(paid.paid_at.is_some());

        let delivered = repo.update_status(&order.id, OrderStatus::Delivered).unwrap();
        assert!(delivered.delivered_at.is_some());

        let err = repo
            .update_status(&order.id, OrderStatus::Paid)
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Paid
            }
        ));
    }

    #[test]
    fn test_update_missing_order() {
        let storage = Storage::in_memory();
        let repo = OrderRepository::new(&storage);
        let err = repo
            .update_status(&OrderId::new("order-missing"), OrderStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[test]
    fn test_by_vendor_and_counts() {
        let storage = Storage::in_memory();
        let repo = OrderRepository::new(&storage);
        let first = repo.create(new_order("crypto_dealer")).unwrap();
        repo.create(new_order("crypto_dealer")).unwrap();
        repo.create(new_order("music_anon")).unwrap();
        repo.update_status(&first.id, OrderStatus::Confirmed).unwrap();

        let vendor = Pseudonym::parse("crypto_dealer").unwrap();
        assert_eq!(repo.by_vendor(&vendor).unwrap().len(), 2);

        let counts = repo.status_counts().unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.confirmed, 1);
    }

    #[test]
    fn test_reveal_is_idempotent() {
        let storage = Storage::in_memory();
        let repo = OrderRepository::new(&storage);
        let order = repo.create(new_order("crypto_dealer")).unwrap();
        assert!(!order.delivery_address.is_visible);

        let first = repo.reveal_delivery_address(&order.id).unwrap().unwrap();
        assert!(first.delivery_address.is_visible);
        let viewed_at = first.delivery_address.viewed_at;
        assert!(viewed_at.is_some());

        let second = repo.reveal_delivery_address(&order.id).unwrap().unwrap();
        assert_eq!(second.delivery_address.viewed_at, viewed_at);
    }

    #[test]
    fn test_redact_overwrites_address() {
        let storage = Storage::in_memory();
        let repo = OrderRepository::new(&storage);
        let order = repo.create(new_order("crypto_dealer")).unwrap();
        repo.reveal_delivery_address(&order.id).unwrap();

        assert!(repo.redact_delivery_address(&order.id).unwrap());
        let stored = repo.get(&order.id).unwrap().unwrap();
        assert!(stored.delivery_address.is_redacted());
        assert_eq!(stored.delivery_address.street, REDACTED_PLACEHOLDER);
        assert!(stored.delivery_address.is_visible);

        assert!(!repo.redact_delivery_address(&OrderId::new("gone")).unwrap());
    }

    #[test]
    fn test_create_many_writes_all_orders() {
        let storage = Storage::in_memory();
        let repo = OrderRepository::new(&storage);
        repo.create(new_order("crypto_dealer")).unwrap();

        let created = repo
            .create_many(vec![new_order("crypto_dealer"), new_order("music_anon")])
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].created_at, created[1].created_at);
        assert_ne!(created[0].id, created[1].id);
        assert_eq!(repo.list().unwrap().len(), 3);
    }

    #[test]
    fn test_huge_payment_window_saturates_deadline() {
        let storage = Storage::in_memory();
        let repo = OrderRepository::with_payment_window(&storage, Duration::MAX);
        let order = repo.create(new_order("crypto_dealer")).unwrap();
        assert_eq!(order.payment_deadline, DateTime::<Utc>::MAX_UTC);
    }
}
