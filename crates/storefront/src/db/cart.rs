//! Shopping cart repository.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use anonshop_core::{Currency, ProductId};

use super::{RepositoryError, keys};
use crate::models::{CartItem, MAX_QUANTITY, NewCartItem};
use crate::storage::Storage;

/// Repository for the shopping cart.
pub struct CartRepository<'a> {
    storage: &'a Storage,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All cart lines in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn items(&self) -> Result<Vec<CartItem>, RepositoryError> {
        Ok(self.storage.load_or_default(keys::CART)?)
    }

    fn save(&self, items: &[CartItem]) -> Result<(), RepositoryError> {
        self.storage.save(keys::CART, items)?;
        Ok(())
    }

    /// Add one unit of a product.
    ///
    /// If the product is already in the cart its quantity is incremented;
    /// otherwise a new line with quantity 1 is appended.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub fn add(&self, item: NewCartItem) -> Result<Vec<CartItem>, RepositoryError> {
        let mut items = self.items()?;

        if let Some(existing) = items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.saturating_add(1).min(MAX_QUANTITY);
            debug!(quantity = existing.quantity, "incremented cart line");
        } else {
            items.push(item.into_line(1));
            debug!("added cart line");
        }

        self.save(&items)?;
        Ok(items)
    }

    /// Remove a line entirely.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn remove(&self, product_id: &ProductId) -> Result<Vec<CartItem>, RepositoryError> {
        let mut items = self.items()?;
        items.retain(|i| &i.product_id != product_id);
        self.save(&items)?;
        Ok(items)
    }

    /// Set a line's quantity. Zero removes the line and anything above
    /// [`MAX_QUANTITY`] is capped.
    ///
    /// Unknown products are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        if quantity == 0 {
            return self.remove(product_id);
        }

        let mut items = self.items()?;
        if let Some(line) = items.iter_mut().find(|i| &i.product_id == product_id) {
            line.quantity = quantity.min(MAX_QUANTITY);
        }
        self.save(&items)?;
        Ok(items)
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn increase(&self, product_id: &ProductId) -> Result<Vec<CartItem>, RepositoryError> {
        match self.quantity_of(product_id)? {
            Some(quantity) => self.set_quantity(product_id, quantity.saturating_add(1)),
            None => self.items(),
        }
    }

    /// Take one unit off a line; the last unit removes the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn decrease(&self, product_id: &ProductId) -> Result<Vec<CartItem>, RepositoryError> {
        match self.quantity_of(product_id)? {
            Some(quantity) => self.set_quantity(product_id, quantity.saturating_sub(1)),
            None => self.items(),
        }
    }

    fn quantity_of(&self, product_id: &ProductId) -> Result<Option<u32>, RepositoryError> {
        Ok(self
            .items()?
            .iter()
            .find(|i| &i.product_id == product_id)
            .map(|i| i.quantity))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<(), RepositoryError> {
        self.storage.delete(keys::CART)?;
        info!("cart cleared");
        Ok(())
    }

    /// Sum of price times quantity over all lines, ignoring currency.
    ///
    /// Use [`Self::totals`] when the cart may mix currencies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Overflow` if the sum leaves the decimal
    /// range, or `RepositoryError::Storage` if the backend fails.
    pub fn total_price(&self) -> Result<Decimal, RepositoryError> {
        self.items()?
            .iter()
            .try_fold(Decimal::ZERO, |total, item| {
                item.line_total().and_then(|line| total.checked_add(line))
            })
            .ok_or_else(|| RepositoryError::Overflow("cart total".to_owned()))
    }

    /// Line totals grouped by currency.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Overflow` if a total leaves the decimal
    /// range, or `RepositoryError::Storage` if the backend fails.
    pub fn totals(&self) -> Result<BTreeMap<Currency, Decimal>, RepositoryError> {
        let mut totals = BTreeMap::new();
        for item in self.items()? {
            let total = totals.entry(item.currency).or_insert(Decimal::ZERO);
            let sum = item
                .line_total()
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| RepositoryError::Overflow(format!("{} total", item.currency)))?;
            *total = sum;
        }
        Ok(totals)
    }

    /// Number of units across all lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn total_items(&self) -> Result<u32, RepositoryError> {
        Ok(self
            .items()?
            .iter()
            .fold(0u32, |count, i| count.saturating_add(i.quantity)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use anonshop_core::Pseudonym;

    use super::*;

    fn item(id: &str, price: Decimal, currency: Currency) -> NewCartItem {
        NewCartItem {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            price,
            currency,
            seller_pseudonym: Pseudonym::parse("crypto_dealer").unwrap(),
            image: None,
        }
    }

    #[test]
    fn test_adding_same_product_increments_quantity() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);

        cart.add(item("p1", Decimal::new(5, 2), Currency::XMR)).unwrap();
        let items = cart.add(item("p1", Decimal::new(5, 2), Currency::XMR)).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(cart.total_items().unwrap(), 2);
    }

    #[test]
    fn test_price_snapshot_kept_on_increment() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);

        cart.add(item("p1", Decimal::new(5, 2), Currency::XMR)).unwrap();
        let items = cart.add(item("p1", Decimal::new(9, 2), Currency::XMR)).unwrap();
        assert_eq!(items[0].price, Decimal::new(5, 2));
    }

    #[test]
    fn test_decrease_last_unit_removes_line() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);
        let id = ProductId::new("p1");

        cart.add(item("p1", Decimal::ONE, Currency::XMR)).unwrap();
        cart.increase(&id).unwrap();
        assert_eq!(cart.decrease(&id).unwrap()[0].quantity, 1);

        let items = cart.decrease(&id).unwrap();
        assert!(items.is_empty());
        assert!(cart.items().unwrap().iter().all(|i| i.quantity > 0));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);
        cart.add(item("p1", Decimal::ONE, Currency::XMR)).unwrap();
        cart.add(item("p2", Decimal::ONE, Currency::XMR)).unwrap();

        let items = cart.set_quantity(&ProductId::new("p1"), 0).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, ProductId::new("p2"));
    }

    #[test]
    fn test_unknown_product_changes_nothing() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);
        cart.add(item("p1", Decimal::ONE, Currency::XMR)).unwrap();

        let items = cart.increase(&ProductId::new("nope")).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn test_totals() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);
        cart.add(item("p1", Decimal::new(5, 2), Currency::XMR)).unwrap();
        cart.add(item("p1", Decimal::new(5, 2), Currency::XMR)).unwrap();
        cart.add(item("p2", Decimal::new(1, 3), Currency::BTC)).unwrap();

        assert_eq!(cart.total_price().unwrap(), Decimal::new(101, 3));
        let totals = cart.totals().unwrap();
        assert_eq!(totals[&Currency::XMR], Decimal::new(10, 2));
        assert_eq!(totals[&Currency::BTC], Decimal::new(1, 3));
    }

    #[test]
    fn test_clear_removes_key() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);
        cart.add(item("p1", Decimal::ONE, Currency::XMR)).unwrap();
        cart.clear().unwrap();

        assert!(!storage.contains(keys::CART).unwrap());
        assert!(cart.items().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_cart_resets_to_empty() {
        let storage = Storage::in_memory();
        storage.set_raw(keys::CART, "not json").unwrap();

        let cart = CartRepository::new(&storage);
        assert!(cart.items().unwrap().is_empty());
        assert!(!storage.contains(keys::CART).unwrap());
    }

    #[test]
    fn test_quantity_is_capped() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);
        let id = ProductId::new("p1");
        cart.add(item("p1", Decimal::ONE, Currency::XMR)).unwrap();

        let items = cart.set_quantity(&id, u32::MAX).unwrap();
        assert_eq!(items[0].quantity, MAX_QUANTITY);
        assert_eq!(cart.increase(&id).unwrap()[0].quantity, MAX_QUANTITY);
        assert_eq!(
            cart.add(item("p1", Decimal::ONE, Currency::XMR)).unwrap()[0].quantity,
            MAX_QUANTITY
        );
    }

    #[test]
    fn test_add_to_stored_max_quantity_does_not_overflow() {
        let storage = Storage::in_memory();
        let mut line = item("p1", Decimal::ONE, Currency::XMR).into_line(1);
        line.quantity = u32::MAX;
        storage.save(keys::CART, &[line]).unwrap();

        let cart = CartRepository::new(&storage);
        let items = cart.add(item("p1", Decimal::ONE, Currency::XMR)).unwrap();
        assert_eq!(items[0].quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_huge_prices_report_overflow() {
        let storage = Storage::in_memory();
        let cart = CartRepository::new(&storage);
        cart.add(item("p1", Decimal::MAX, Currency::XMR)).unwrap();
        cart.add(item("p1", Decimal::MAX, Currency::XMR)).unwrap();

        assert!(matches!(cart.total_price(), Err(RepositoryError::Overflow(_))));
        assert!(matches!(cart.totals(), Err(RepositoryError::Overflow(_))));
        assert_eq!(cart.total_items().unwrap(), 2);
    }
}
