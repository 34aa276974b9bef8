//! Payout wallet repository.
//!
//! Two unrelated records share this repository: the admin's own BTC/XMR
//! receiving wallets, and each vendor's USDT payout address. Vendor
//! addresses are also mirrored into the admin vendor list so the admin
//! panel can show them without scanning per-vendor keys.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tracing::{info, instrument};

use anonshop_core::Pseudonym;

use super::{RepositoryError, keys};
use crate::models::{CryptoWallets, VendorWalletRecord};
use crate::storage::Storage;

static TRC20_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T[A-Za-z0-9]{33}$").expect("Invalid regex"));

static ERC20_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("Invalid regex"));

static OMNI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[13][a-km-zA-HJ-NP-Z1-9]{25,34}$").expect("Invalid regex")
});

/// Whether `address` looks like a USDT address on Tron, Ethereum or Omni.
#[must_use]
pub fn validate_usdt_address(address: &str) -> bool {
    TRC20_RE.is_match(address) || ERC20_RE.is_match(address) || OMNI_RE.is_match(address)
}

/// Repository for admin and vendor wallets.
pub struct WalletRepository<'a> {
    storage: &'a Storage,
}

impl<'a> WalletRepository<'a> {
    /// Create a new wallet repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The admin receiving wallets; empty addresses if never configured.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn admin_wallets(&self) -> Result<CryptoWallets, RepositoryError> {
        Ok(self.storage.load_or_default(keys::ADMIN_WALLETS)?)
    }

    /// Replace the admin receiving wallets.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if either address is empty.
    #[instrument(skip(self))]
    pub fn update_admin_wallets(
        &self,
        btc_address: &str,
        xmr_address: &str,
    ) -> Result<CryptoWallets, RepositoryError> {
        let btc_address = btc_address.trim();
        let xmr_address = xmr_address.trim();

        let mut errors = Vec::new();
        if btc_address.is_empty() {
            errors.push("BTC address is required".to_owned());
        }
        if xmr_address.is_empty() {
            errors.push("XMR address is required".to_owned());
        }
        if !errors.is_empty() {
            return Err(RepositoryError::validation(&errors));
        }

        let wallets = CryptoWallets {
            btc_address: btc_address.to_owned(),
            xmr_address: xmr_address.to_owned(),
            last_updated: Some(Utc::now()),
        };
        self.storage.save(keys::ADMIN_WALLETS, &wallets)?;
        info!("admin wallets updated");
        Ok(wallets)
    }

    /// A vendor's USDT payout address, if set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn vendor_wallet(&self, pseudonym: &Pseudonym) -> Result<Option<String>, RepositoryError> {
        Ok(self.storage.load(&keys::vendor_wallet(pseudonym))?)
    }

    /// Set a vendor's USDT payout address and mirror it into the admin list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the address is not a valid
    /// TRC-20, ERC-20 or Omni USDT address.
    #[instrument(skip(self))]
    pub fn set_vendor_wallet(
        &self,
        pseudonym: &Pseudonym,
        address: &str,
    ) -> Result<VendorWalletRecord, RepositoryError> {
        let address = address.trim();
        if !validate_usdt_address(address) {
            return Err(RepositoryError::Validation(format!(
                "invalid USDT address: {address}"
            )));
        }

        self.storage.save(&keys::vendor_wallet(pseudonym), address)?;

        let record = VendorWalletRecord {
            pseudonym: pseudonym.clone(),
            wallet_address: address.to_owned(),
            last_updated: Utc::now(),
        };
        let mut records = self.vendor_records()?;
        records.retain(|r| &r.pseudonym != pseudonym);
        records.push(record.clone());
        self.storage.save(keys::ADMIN_VENDOR_DATA, &records)?;

        info!(vendor = %pseudonym, "vendor wallet updated");
        Ok(record)
    }

    /// Every vendor payout wallet known to the admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn vendor_records(&self) -> Result<Vec<VendorWalletRecord>, RepositoryError> {
        Ok(self.storage.load_or_default(keys::ADMIN_VENDOR_DATA)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TRON: &str = "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf";
    const ERC20: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
    const OMNI: &str = "1BoatSLRHtKNngkdXEeobR76b53LETtpyT";

    #[test]
    fn test_usdt_address_formats() {
        assert!(validate_usdt_address(TRON));
        assert!(validate_usdt_address(ERC20));
        assert!(validate_usdt_address(OMNI));

        assert!(!validate_usdt_address(""));
        assert!(!validate_usdt_address("T123"));
        assert!(!validate_usdt_address("0x742d35Cc6634C0532925a3b844Bc454e4438f44"));
        assert!(!validate_usdt_address("1BoatSLRHtKNngkdXEeobR76b53LETtpy0"));
    }

    #[test]
    fn test_admin_wallets_require_both_addresses() {
        let storage = Storage::in_memory();
        let repo = WalletRepository::new(&storage);

        assert_eq!(repo.admin_wallets().unwrap(), CryptoWallets::default());
        let err = repo.update_admin_wallets("bc1qxyz", "  ").unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));

        let wallets = repo.update_admin_wallets("bc1qxyz", "4abc").unwrap();
        assert!(wallets.last_updated.is_some());
        assert_eq!(repo.admin_wallets().unwrap(), wallets);
    }

    #[test]
    fn test_vendor_wallet_mirrored_once() {
        let storage = Storage::in_memory();
        let repo = WalletRepository::new(&storage);
        let vendor = Pseudonym::parse("crypto_dealer").unwrap();

        repo.set_vendor_wallet(&vendor, TRON).unwrap();
        repo.set_vendor_wallet(&vendor, ERC20).unwrap();

        assert_eq!(repo.vendor_wallet(&vendor).unwrap().as_deref(), Some(ERC20));
        let records = repo.vendor_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].wallet_address, ERC20);
    }

    #[test]
    fn test_invalid_vendor_wallet_not_stored() {
        let storage = Storage::in_memory();
        let repo = WalletRepository::new(&storage);
        let vendor = Pseudonym::parse("crypto_dealer").unwrap();

        assert!(repo.set_vendor_wallet(&vendor, "not-an-address").is_err());
        assert!(repo.vendor_wallet(&vendor).unwrap().is_none());
        assert!(repo.vendor_records().unwrap().is_empty());
    }
}
