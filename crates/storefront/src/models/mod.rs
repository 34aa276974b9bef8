//! Domain models persisted by the storefront.
//!
//! Every model serializes to camelCase JSON; the blobs are stored under the
//! keys listed in [`crate::db::keys`].

pub mod bot;
pub mod cart;
pub mod design;
pub mod license;
pub mod order;
pub mod product;
pub mod session;
pub mod vendor;
pub mod wallet;

pub use bot::{SessionBotConfig, TelegramBotConfig};
pub use cart::{CartItem, MAX_QUANTITY, NewCartItem};
pub use design::{DesignSettings, DesignUpdate};
pub use license::VendorLicense;
pub use order::{NewOrder, Order, OrderItem};
pub use product::{MAX_PRICE, MAX_STOCK, NewProduct, Product, ProductUpdate};
pub use session::UserSession;
pub use vendor::{NewMessage, NewVendorStat, VendorBanner, VendorCode, VendorMessage, VendorStat};
pub use wallet::{CryptoWallets, VendorWalletRecord};
