//! Shopping cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use anonshop_core::{Currency, ProductId, Pseudonym};

use super::Product;

/// Most units a single cart line can hold.
pub const MAX_QUANTITY: u32 = 10_000;

/// A line in the cart.
///
/// `price` is a snapshot taken when the item was first added; later catalog
/// price changes do not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub currency: Currency,
    /// Between 1 and [`MAX_QUANTITY`]; a line that would drop to 0 is removed instead.
    pub quantity: u32,
    pub seller_pseudonym: Pseudonym,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// Price multiplied by quantity, or `None` if the product overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Input for adding a product to the cart.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub currency: Currency,
    pub seller_pseudonym: Pseudonym,
    pub image: Option<String>,
}

impl NewCartItem {
    pub(crate) fn into_line(self, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.product_id,
            title: self.title,
            price: self.price,
            currency: self.currency,
            quantity,
            seller_pseudonym: self.seller_pseudonym,
            image: self.image,
        }
    }
}

impl From<&Product> for NewCartItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            currency: product.currency,
            seller_pseudonym: product.pseudonym.clone(),
            image: product.images.first().cloned(),
        }
    }
}
