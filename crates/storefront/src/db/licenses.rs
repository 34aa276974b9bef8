//! Vendor license repository.
//!
//! Prospective vendors apply for a username, pay the current fee and wait
//! for the admin to approve. Status only moves `unpaid -> paid -> approved`.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use anonshop_core::{LicenseStatus, Pseudonym};

use super::{RepositoryError, keys};
use crate::models::VendorLicense;
use crate::random::{LOWER_ALNUM, random_string};
use crate::storage::Storage;

/// Fee in EUR when the admin hasn't set one.
pub const DEFAULT_LICENSE_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Repository for vendor license applications.
pub struct LicenseRepository<'a> {
    storage: &'a Storage,
}

impl<'a> LicenseRepository<'a> {
    /// Create a new license repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The current license fee in EUR.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn fee(&self) -> Result<Decimal, RepositoryError> {
        Ok(self
            .storage
            .load(keys::LICENSE_FEE)?
            .unwrap_or(DEFAULT_LICENSE_FEE))
    }

    /// Change the license fee for future applications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the fee is not positive.
    #[instrument(skip(self))]
    pub fn set_fee(&self, fee: Decimal) -> Result<(), RepositoryError> {
        if fee <= Decimal::ZERO {
            return Err(RepositoryError::Validation(
                "license fee must be greater than zero".to_owned(),
            ));
        }
        self.storage.save(keys::LICENSE_FEE, &fee)?;
        info!(%fee, "license fee updated");
        Ok(())
    }

    /// All applications, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn list(&self) -> Result<Vec<VendorLicense>, RepositoryError> {
        Ok(self.storage.load_or_default(keys::LICENSES)?)
    }

    /// Get an application by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn get(&self, id: &str) -> Result<Option<VendorLicense>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|l| l.id == id))
    }

    /// Apply for a vendor license at the current fee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidPseudonym` if the username is not a
    /// valid pseudonym, or `RepositoryError::Conflict` if it is already taken.
    #[instrument(skip(self))]
    pub fn apply(&self, username: &str) -> Result<VendorLicense, RepositoryError> {
        let username = Pseudonym::parse(username)?;
        let mut licenses = self.list()?;
        if licenses.iter().any(|l| l.username == username) {
            return Err(RepositoryError::Conflict(format!(
                "username {username} already taken"
            )));
        }

        let now = Utc::now();
        let license = VendorLicense {
            id: format!(
                "LIC-{}-{}",
                now.timestamp_millis(),
                random_string(LOWER_ALNUM, 9)
            ),
            username,
            fee: self.fee()?,
            status: LicenseStatus::Unpaid,
            tx_hash: None,
            created_at: now,
            paid_at: None,
        };
        licenses.push(license.clone());
        self.storage.save(keys::LICENSES, &licenses)?;

        info!(license_id = %license.id, "license application created");
        Ok(license)
    }

    /// Record payment of an unpaid application.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the transaction hash is empty,
    /// `RepositoryError::NotFound` if no such application exists, or
    /// `RepositoryError::Conflict` if it was already paid.
    #[instrument(skip(self))]
    pub fn mark_paid(&self, id: &str, tx_hash: &str) -> Result<VendorLicense, RepositoryError> {
        let tx_hash = tx_hash.trim();
        if tx_hash.is_empty() {
            return Err(RepositoryError::Validation(
                "transaction hash is required".to_owned(),
            ));
        }

        self.transition(id, LicenseStatus::Unpaid, |license| {
            license.status = LicenseStatus::Paid;
            license.tx_hash = Some(tx_hash.to_owned());
            license.paid_at = Some(Utc::now());
        })
    }

    /// Approve a paid application.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such application exists, or
    /// `RepositoryError::Conflict` if it isn't in the paid state.
    #[instrument(skip(self))]
    pub fn approve(&self, id: &str) -> Result<VendorLicense, RepositoryError> {
        self.transition(id, LicenseStatus::Paid, |license| {
            license.status = LicenseStatus::Approved;
        })
    }

    fn transition(
        &self,
        id: &str,
        expected: LicenseStatus,
        f: impl FnOnce(&mut VendorLicense),
    ) -> Result<VendorLicense, RepositoryError> {
        let mut licenses = self.list()?;
        let license = licenses
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("license {id}")))?;

        if license.status != expected {
            return Err(RepositoryError::Conflict(format!(
                "license {id} is {}, expected {expected}",
                license.status
            )));
        }

        f(license);
        let updated = license.clone();
        self.storage.save(keys::LICENSES, &licenses)?;
        info!(license_id = %id, status = %updated.status, "license status updated");
        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fee() {
        let storage = Storage::in_memory();
        let repo = LicenseRepository::new(&storage);
        assert_eq!(repo.fee().unwrap(), Decimal::from(500));

        assert!(repo.set_fee(Decimal::ZERO).is_err());
        repo.set_fee(Decimal::from(250)).unwrap();
        assert_eq!(repo.fee().unwrap(), Decimal::from(250));
    }

    #[test]
    fn test_apply_id_format_and_fee_snapshot() {
        let storage = Storage::in_memory();
        let repo = LicenseRepository::new(&storage);

        let license = repo.apply("new_vendor").unwrap();
        let parts: Vec<&str> = license.id.splitn(3, '-').collect();
        assert_eq!(parts[0], "LIC");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert_eq!(license.status, LicenseStatus::Unpaid);

        repo.set_fee(Decimal::from(900)).unwrap();
        assert_eq!(repo.get(&license.id).unwrap().unwrap().fee, Decimal::from(500));
    }

    #[test]
    fn test_username_rules() {
        let storage = Storage::in_memory();
        let repo = LicenseRepository::new(&storage);

        assert!(matches!(
            repo.apply("no").unwrap_err(),
            RepositoryError::InvalidPseudonym(_)
        ));
        repo.apply("new_vendor").unwrap();
        assert!(matches!(
            repo.apply("new_vendor").unwrap_err(),
            RepositoryError::Conflict(_)
        ));
    }

    #[test]
    fn test_lifecycle() {
        let storage = Storage::in_memory();
        let repo = LicenseRepository::new(&storage);
        let license = repo.apply("new_vendor").unwrap();

        assert!(matches!(
            repo.approve(&license.id).unwrap_err(),
            RepositoryError::Conflict(_)
        ));
        assert!(matches!(
            repo.mark_paid(&license.id, " ").unwrap_err(),
            RepositoryError::Validation(_)
        ));

        let paid = repo.mark_paid(&license.id, "0xfeed").unwrap();
        assert_eq!(paid.status, LicenseStatus::Paid);
        assert!(paid.paid_at.is_some());

        let approved = repo.approve(&license.id).unwrap();
        assert_eq!(approved.status, LicenseStatus::Approved);
        assert_eq!(approved.tx_hash.as_deref(), Some("0xfeed"));
    }
}
