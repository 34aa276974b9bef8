//! Marketplace listing queries.

use std::collections::BTreeMap;

use anonshop_core::Pseudonym;

use crate::db::{BannerRepository, ProductRepository, RepositoryError};
use crate::models::{Product, VendorBanner};
use crate::storage::Storage;

/// Group visible products by owner, dropping vendors whose banner is hidden
/// or in invisible mode.
///
/// `banner` returns `None` for vendors without (readable) banner data; those
/// vendors are listed.
pub fn group_visible_vendors(
    products: Vec<Product>,
    mut banner: impl FnMut(&Pseudonym) -> Option<VendorBanner>,
) -> BTreeMap<Pseudonym, Vec<Product>> {
    let mut vendors: BTreeMap<Pseudonym, Vec<Product>> = BTreeMap::new();
    for product in products.into_iter().filter(|p| p.visibility) {
        vendors
            .entry(product.pseudonym.clone())
            .or_default()
            .push(product);
    }
    vendors.retain(|pseudonym, _| banner(pseudonym).is_none_or(|b| b.is_listed()));
    vendors
}

/// Vendors shown on the marketplace front page with their visible products.
///
/// # Errors
///
/// Returns `RepositoryError::Storage` if the backend fails.
pub fn visible_vendors(
    storage: &Storage,
) -> Result<BTreeMap<Pseudonym, Vec<Product>>, RepositoryError> {
    let products = ProductRepository::new(storage).public()?;
    let banners = BannerRepository::new(storage);

    let mut lookup_error = None;
    let vendors = group_visible_vendors(products, |pseudonym| match banners.get(pseudonym) {
        Ok(banner) => Some(banner),
        Err(e) => {
            lookup_error.get_or_insert(e);
            None
        }
    });
    match lookup_error {
        Some(e) => Err(e),
        None => Ok(vendors),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::keys;

    #[test]
    fn test_demo_vendors_listed_by_default() {
        let storage = Storage::in_memory();
        let vendors = visible_vendors(&storage).unwrap();

        let names: Vec<&str> = vendors.keys().map(Pseudonym::as_str).collect();
        assert_eq!(names, vec!["crypto_dealer", "music_anon"]);
    }

    #[test]
    fn test_hidden_and_invisible_vendors_dropped() {
        let storage = Storage::in_memory();
        let banners = BannerRepository::new(&storage);
        banners
            .set_invisible_mode(&Pseudonym::from_stored("crypto_dealer"), true)
            .unwrap();

        let vendors = visible_vendors(&storage).unwrap();
        assert_eq!(vendors.len(), 1);
        assert!(vendors.contains_key(&Pseudonym::from_stored("music_anon")));

        banners
            .set_visibility(&Pseudonym::from_stored("music_anon"), false)
            .unwrap();
        assert!(visible_vendors(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_banner_counts_as_visible() {
        let storage = Storage::in_memory();
        let vendor = Pseudonym::from_stored("music_anon");
        storage
            .set_raw(&keys::vendor_banner(&vendor), "{\"isVisible\": fals")
            .unwrap();

        let vendors = visible_vendors(&storage).unwrap();
        assert!(vendors.contains_key(&vendor));
    }
}
