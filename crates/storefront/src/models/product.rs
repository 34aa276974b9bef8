//! Catalog products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use anonshop_core::{Currency, Price, ProductId, Pseudonym};

/// Highest accepted listing price, in the listing currency.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Highest accepted stock count.
pub const MAX_STOCK: u32 = 1_000_000;

/// Field checks shared by [`NewProduct`] and [`ProductUpdate`].
fn check_price(price: Decimal, errors: &mut Vec<String>) {
    if price <= Decimal::ZERO {
        errors.push("price must be greater than zero".to_owned());
    } else if price > MAX_PRICE {
        errors.push(format!("price must not exceed {MAX_PRICE}"));
    }
}

fn check_stock(stock: u32, errors: &mut Vec<String>) {
    if stock > MAX_STOCK {
        errors.push(format!("stock must not exceed {MAX_STOCK}"));
    }
}

/// A product listed by a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    /// Owning vendor.
    pub pseudonym: Pseudonym,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: u32,
    pub category: String,
    /// Hidden products are only listed on the owner's dashboard.
    pub visibility: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The listed price with its currency.
    #[must_use]
    pub const fn listed_price(&self) -> Price {
        Price {
            amount: self.price,
            currency: self.currency,
        }
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub pseudonym: Pseudonym,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub currency: Currency,
    pub images: Vec<String>,
    pub stock: u32,
    pub category: String,
    pub visibility: bool,
}

impl NewProduct {
    /// Validate the product form.
    ///
    /// Returns one message per failing field, empty when the input is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title is required".to_owned());
        }
        if self.description.trim().is_empty() {
            errors.push("description is required".to_owned());
        }
        check_price(self.price, &mut errors);
        check_stock(self.stock, &mut errors);
        if self.category.trim().is_empty() {
            errors.push("category is required".to_owned());
        }
        errors
    }
}

/// Partial update for an existing product. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<Currency>,
    pub images: Option<Vec<String>>,
    pub stock: Option<u32>,
    pub category: Option<String>,
    pub visibility: Option<bool>,
}

impl ProductUpdate {
    /// Validate the fields that are being changed.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push("title is required".to_owned());
        }
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            errors.push("description is required".to_owned());
        }
        if let Some(price) = self.price {
            check_price(price, &mut errors);
        }
        if let Some(stock) = self.stock {
            check_stock(stock, &mut errors);
        }
        if self.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            errors.push("category is required".to_owned());
        }
        errors
    }

    /// Apply the update to `product`. Text fields are trimmed.
    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title.trim().to_owned();
        }
        if let Some(description) = self.description {
            product.description = description.trim().to_owned();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(currency) = self.currency {
            product.currency = currency;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category.trim().to_owned();
        }
        if let Some(visibility) = self.visibility {
            product.visibility = visibility;
        }
    }
}
