//! Vendor banner repository.

use tracing::{info, instrument};

use anonshop_core::Pseudonym;

use super::{RepositoryError, keys};
use crate::models::VendorBanner;
use crate::storage::Storage;

/// Repository for per-vendor banner and listing settings.
pub struct BannerRepository<'a> {
    storage: &'a Storage,
}

impl<'a> BannerRepository<'a> {
    /// Create a new banner repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The vendor's banner, or the visible default if none is stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn get(&self, pseudonym: &Pseudonym) -> Result<VendorBanner, RepositoryError> {
        Ok(self
            .storage
            .load(&keys::vendor_banner(pseudonym))?
            .unwrap_or_else(|| VendorBanner::default_for(pseudonym.clone())))
    }

    /// Store the banner under its owner's key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self, banner), fields(vendor = %banner.pseudonym))]
    pub fn save(&self, banner: &VendorBanner) -> Result<(), RepositoryError> {
        self.storage
            .save(&keys::vendor_banner(&banner.pseudonym), banner)?;
        info!("vendor banner saved");
        Ok(())
    }

    fn modify(
        &self,
        pseudonym: &Pseudonym,
        f: impl FnOnce(&mut VendorBanner),
    ) -> Result<VendorBanner, RepositoryError> {
        let mut banner = self.get(pseudonym)?;
        f(&mut banner);
        self.save(&banner)?;
        Ok(banner)
    }

    /// Show or hide the vendor in the marketplace.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_visibility(
        &self,
        pseudonym: &Pseudonym,
        visible: bool,
    ) -> Result<VendorBanner, RepositoryError> {
        self.modify(pseudonym, |b| b.is_visible = visible)
    }

    /// Toggle invisible mode, which hides the vendor regardless of visibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_invisible_mode(
        &self,
        pseudonym: &Pseudonym,
        enabled: bool,
    ) -> Result<VendorBanner, RepositoryError> {
        self.modify(pseudonym, |b| b.invisible_mode = enabled)
    }

    /// Set the shop's display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_shop_name(
        &self,
        pseudonym: &Pseudonym,
        name: &str,
    ) -> Result<VendorBanner, RepositoryError> {
        let name = name.trim().to_owned();
        self.modify(pseudonym, |b| b.shop_name = name)
    }

    /// Set or clear the banner image URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_banner_image(
        &self,
        pseudonym: &Pseudonym,
        image: Option<String>,
    ) -> Result<VendorBanner, RepositoryError> {
        self.modify(pseudonym, |b| b.banner_image = image)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_banner_defaults_visible() {
        let storage = Storage::in_memory();
        let repo = BannerRepository::new(&storage);
        let vendor = Pseudonym::parse("crypto_dealer").unwrap();

        let banner = repo.get(&vendor).unwrap();
        assert!(banner.is_listed());
        assert!(!storage.contains(&keys::vendor_banner(&vendor)).unwrap());
    }

    #[test]
    fn test_setters_persist() {
        let storage = Storage::in_memory();
        let repo = BannerRepository::new(&storage);
        let vendor = Pseudonym::parse("crypto_dealer").unwrap();

        repo.set_shop_name(&vendor, "  Crypto Corner ").unwrap();
        repo.set_banner_image(&vendor, Some("/banner.png".to_owned()))
            .unwrap();
        repo.set_invisible_mode(&vendor, true).unwrap();

        let banner = repo.get(&vendor).unwrap();
        assert_eq!(banner.shop_name, "Crypto Corner");
        assert_eq!(banner.banner_image.as_deref(), Some("/banner.png"));
        assert!(banner.is_visible);
        assert!(!banner.is_listed());
    }
}
