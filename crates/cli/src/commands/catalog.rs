//! Product, cart and marketplace commands.

use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::field::display;
use tracing::{info, warn};

use anonshop_core::{Currency, ProductId};
use anonshop_storefront::db::{CartRepository, ProductRepository};
use anonshop_storefront::error::AppError;
use anonshop_storefront::models::{NewCartItem, NewProduct, Product, ProductUpdate};
use anonshop_storefront::services::visible_vendors;
use anonshop_storefront::state::AppState;

use super::{CliError, require_session};

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products (public catalog by default)
    List {
        /// Only your own products, hidden ones included
        #[arg(long, conflicts_with = "in_stock")]
        mine: bool,

        /// Only visible products with stock left
        #[arg(long)]
        in_stock: bool,
    },
    /// Show one product
    Show { id: ProductId },
    /// Create a product owned by the active session
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value = "XMR")]
        currency: Currency,
        #[arg(long, default_value_t = 0)]
        stock: u32,
        #[arg(long, default_value = "")]
        category: String,
        /// Image URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
        /// Create the product hidden from the catalog
        #[arg(long)]
        hidden: bool,
    },
    /// Change fields of one of your products
    Update {
        id: ProductId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        stock: Option<u32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        visible: Option<bool>,
    },
    /// Delete one of your products
    Delete { id: ProductId },
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Remove a product line
    Remove { product_id: ProductId },
    /// Set the quantity of a line (0 removes it)
    Set { product_id: ProductId, quantity: u32 },
    /// Increase a line by one
    Inc { product_id: ProductId },
    /// Decrease a line by one
    Dec { product_id: ProductId },
    /// Empty the cart
    Clear,
}

fn log_product(product: &Product) {
    info!(
        id = %product.id,
        vendor = %product.pseudonym,
        title = %product.title,
        price = %product.listed_price(),
        stock = product.stock,
        visible = product.visibility,
        "Product"
    );
}

/// Load a product and check the active session owns it.
fn owned_product(state: &AppState, id: &ProductId) -> Result<Product, CliError> {
    let owner = require_session(state)?;
    let product = ProductRepository::new(state.storage())
        .get(id)?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    if product.pseudonym != owner {
        return Err(AppError::Unauthorized(format!("product {id} belongs to another vendor")).into());
    }
    Ok(product)
}

/// Run a product command.
///
/// # Errors
///
/// Returns an error if validation, ownership or storage fails.
pub fn product(state: &AppState, action: ProductAction) -> Result<(), CliError> {
    let products = ProductRepository::new(state.storage());

    match action {
        ProductAction::List { mine, in_stock } => {
            let list = if mine {
                products.all_by_owner(&require_session(state)?)?
            } else if in_stock {
                products.in_stock()?
            } else {
                products.public()?
            };
            info!(count = list.len(), "Products");
            list.iter().for_each(log_product);
        }
        ProductAction::Show { id } => {
            let product = products
                .get(&id)?
                .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
            log_product(&product);
            info!(description = %product.description, category = %product.category, "Details");
        }
        ProductAction::Add {
            title,
            description,
            price,
            currency,
            stock,
            category,
            images,
            hidden,
        } => {
            let product = products.create(NewProduct {
                pseudonym: require_session(state)?,
                title,
                description,
                price,
                currency,
                images,
                stock,
                category,
                visibility: !hidden,
            })?;
            info!(id = %product.id, "Product created");
        }
        ProductAction::Update {
            id,
            title,
            description,
            price,
            currency,
            stock,
            category,
            visible,
        } => {
            owned_product(state, &id)?;
            let update = ProductUpdate {
                title,
                description,
                price,
                currency,
                images: None,
                stock,
                category,
                visibility: visible,
            };
            if let Some(product) = products.update(&id, update)? {
                log_product(&product);
            }
        }
        ProductAction::Delete { id } => {
            owned_product(state, &id)?;
            products.delete(&id)?;
            info!(id = %id, "Product deleted");
        }
    }
    Ok(())
}

/// Run a cart command.
///
/// # Errors
///
/// Returns an error if the product doesn't exist or storage fails.
pub fn cart(state: &AppState, action: CartAction) -> Result<(), CliError> {
    let cart = CartRepository::new(state.storage());

    match action {
        CartAction::Show => {}
        CartAction::Add { product_id } => {
            let product = ProductRepository::new(state.storage())
                .get(&product_id)?
                .filter(|p| p.visibility)
                .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
            if !product.in_stock() {
                warn!(id = %product.id, "Product is out of stock");
            }
            cart.add(NewCartItem::from(&product))?;
        }
        CartAction::Remove { product_id } => {
            cart.remove(&product_id)?;
        }
        CartAction::Set {
            product_id,
            quantity,
        } => {
            cart.set_quantity(&product_id, quantity)?;
        }
        CartAction::Inc { product_id } => {
            cart.increase(&product_id)?;
        }
        CartAction::Dec { product_id } => {
            cart.decrease(&product_id)?;
        }
        CartAction::Clear => {
            cart.clear()?;
        }
    }

    for item in cart.items()? {
        info!(
            product_id = %item.product_id,
            title = %item.title,
            quantity = item.quantity,
            line_total = item.line_total().map(display),
            currency = %item.currency,
            seller = %item.seller_pseudonym,
            "Cart line"
        );
    }
    for (currency, total) in cart.totals()? {
        info!(total = %total, currency = %currency, "Cart total");
    }
    let items = cart.total_items()?;
    info!(items, "Cart size");
    Ok(())
}

/// List vendors visible on the marketplace.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn marketplace(state: &AppState) -> Result<(), CliError> {
    let vendors = visible_vendors(state.storage())?;
    info!(count = vendors.len(), "Marketplace vendors");

    for (vendor, products) in &vendors {
        info!(vendor = %vendor, products = products.len(), "Vendor");
        products.iter().for_each(log_product);
    }
    Ok(())
}
