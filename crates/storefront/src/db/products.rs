//! Product catalog repository.
//!
//! The catalog is a single list under [`keys::PRODUCTS`]. When the key is
//! missing or unreadable the two demo listings are written in its place, so
//! the marketplace is never empty on a fresh profile.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use anonshop_core::{Currency, ProductId, Pseudonym};

use super::{RepositoryError, keys};
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::storage::Storage;

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    storage: &'a Storage,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All products, seeding the demo catalog if none is stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        if let Some(products) = self.storage.load(keys::PRODUCTS)? {
            return Ok(products);
        }

        let demo = demo_products();
        self.storage.save(keys::PRODUCTS, &demo)?;
        info!(count = demo.len(), "seeded demo catalog");
        Ok(demo)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|p| &p.id == id))
    }

    /// Visible products of one vendor, as shown on their public shop page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn by_owner(&self, pseudonym: &Pseudonym) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| &p.pseudonym == pseudonym && p.visibility)
            .collect())
    }

    /// Every product of one vendor, hidden ones included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn all_by_owner(&self, pseudonym: &Pseudonym) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| &p.pseudonym == pseudonym)
            .collect())
    }

    /// All visible products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn public(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.list()?.into_iter().filter(|p| p.visibility).collect())
    }

    /// Visible products that still have stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn in_stock(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .public()?
            .into_iter()
            .filter(Product::in_stock)
            .collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if a required field is empty or
    /// the price is not positive.
    #[instrument(skip(self, input), fields(owner = %input.pseudonym))]
    pub fn create(&self, input: NewProduct) -> Result<Product, RepositoryError> {
        let errors = input.validate();
        if !errors.is_empty() {
            return Err(RepositoryError::validation(&errors));
        }

        let now = Utc::now();
        let product = Product {
            id: ProductId::generate(),
            pseudonym: input.pseudonym,
            title: input.title.trim().to_owned(),
            description: input.description.trim().to_owned(),
            price: input.price,
            currency: input.currency,
            images: input.images,
            stock: input.stock,
            category: input.category.trim().to_owned(),
            visibility: input.visibility,
            created_at: now,
            updated_at: now,
        };

        let mut products = self.list()?;
        products.push(product.clone());
        self.storage.save(keys::PRODUCTS, &products)?;

        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Apply a partial update and bump `updated_at`.
    ///
    /// Returns `None` if no product has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if a changed field is invalid.
    #[instrument(skip(self, update))]
    pub fn update(
        &self,
        id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let errors = update.validate();
        if !errors.is_empty() {
            return Err(RepositoryError::validation(&errors));
        }

        let mut products = self.list()?;
        let Some(product) = products.iter_mut().find(|p| &p.id == id) else {
            return Ok(None);
        };

        update.apply(product);
        product.updated_at = Utc::now();
        let updated = product.clone();

        self.storage.save(keys::PRODUCTS, &products)?;
        info!(product_id = %id, "product updated");
        Ok(Some(updated))
    }

    /// Delete a product. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.list()?;
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Ok(false);
        }

        self.storage.save(keys::PRODUCTS, &products)?;
        info!(product_id = %id, "product deleted");
        Ok(true)
    }
}

/// The listings a fresh profile starts with.
fn demo_products() -> Vec<Product> {
    let now = Utc::now();
    vec![
        Product {
            id: ProductId::new("demo-1"),
            pseudonym: Pseudonym::from_stored("crypto_dealer"),
            title: "Privacy Guide PDF".to_owned(),
            description:
                "Complete guide to digital privacy and anonymity. 150 pages of expert knowledge."
                    .to_owned(),
            price: Decimal::new(5, 2),
            currency: Currency::XMR,
            images: vec!["/placeholder.svg".to_owned()],
            stock: 100,
            category: "E-Books".to_owned(),
            visibility: true,
            created_at: now,
            updated_at: now,
        },
        Product {
            id: ProductId::new("demo-2"),
            pseudonym: Pseudonym::from_stored("music_anon"),
            title: "Underground Beats Album".to_owned(),
            description: "Exclusive electronic music collection. High quality FLAC files."
                .to_owned(),
            price: Decimal::new(8, 2),
            currency: Currency::XMR,
            images: vec!["/placeholder.svg".to_owned()],
            stock: 50,
            category: "Music".to_owned(),
            visibility: true,
            created_at: now,
            updated_at: now,
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vendor() -> Pseudonym {
        Pseudonym::parse("shadow_books").unwrap()
    }

    fn new_product(title: &str, visibility: bool) -> NewProduct {
        NewProduct {
            pseudonym: vendor(),
            title: title.to_owned(),
            description: "A description".to_owned(),
            price: Decimal::new(12, 2),
            currency: Currency::XMR,
            images: Vec::new(),
            stock: 3,
            category: "Books".to_owned(),
            visibility,
        }
    }

    #[test]
    fn test_fresh_profile_seeds_demo_catalog() {
        let storage = Storage::in_memory();
        let repo = ProductRepository::new(&storage);

        let products = repo.list().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, ProductId::new("demo-1"));
        assert!(storage.contains(keys::PRODUCTS).unwrap());
    }

    #[test]
    fn test_corrupted_catalog_reseeds_demo() {
        let storage = Storage::in_memory();
        storage.set_raw(keys::PRODUCTS, "[{\"id\":").unwrap();

        let products = ProductRepository::new(&storage).list().unwrap();
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn test_create_assigns_unique_ids() {
        let storage = Storage::in_memory();
        let repo = ProductRepository::new(&storage);

        let a = repo.create(new_product("First", true)).unwrap();
        let b = repo.create(new_product("Second", true)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(repo.list().unwrap().len(), 4);
    }

    #[test]
    fn test_create_rejects_invalid_form() {
        let storage = Storage::in_memory();
        let repo = ProductRepository::new(&storage);

        let mut input = new_product("", true);
        input.price = Decimal::ZERO;
        let err = repo.create(input).unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[test]
    fn test_owner_queries_respect_visibility() {
        let storage = Storage::in_memory();
        let repo = ProductRepository::new(&storage);
        repo.create(new_product("Shown", true)).unwrap();
        repo.create(new_product("Hidden", false)).unwrap();

        assert_eq!(repo.by_owner(&vendor()).unwrap().len(), 1);
        assert_eq!(repo.all_by_owner(&vendor()).unwrap().len(), 2);
        assert_eq!(repo.public().unwrap().len(), 3);
    }

    #[test]
    fn test_update_bumps_timestamp() {
        let storage = Storage::in_memory();
        let repo = ProductRepository::new(&storage);
        let created = repo.create(new_product("Old title", true)).unwrap();

        let updated = repo
            .update(
                &created.id,
                ProductUpdate {
                    title: Some("New title".to_owned()),
                    stock: Some(0),
                    ..ProductUpdate::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.stock, 0);
        assert!(updated.updated_at >= created.updated_at);
        assert!(!repo.in_stock().unwrap().iter().any(|p| p.id == created.id));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let storage = Storage::in_memory();
        let repo = ProductRepository::new(&storage);
        let result = repo
            .update(&ProductId::new("missing"), ProductUpdate::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete() {
        let storage = Storage::in_memory();
        let repo = ProductRepository::new(&storage);

        assert!(repo.delete(&ProductId::new("demo-1")).unwrap());
        assert!(!repo.delete(&ProductId::new("demo-1")).unwrap());
        assert!(repo.get(&ProductId::new("demo-1")).unwrap().is_none());
    }
}
