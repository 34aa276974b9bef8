//! Vendor activity feed repository.

use chrono::Utc;
use tracing::{debug, info, instrument};

use anonshop_core::{Pseudonym, StatId};

use super::{RepositoryError, keys};
use crate::models::{NewVendorStat, VendorStat};
use crate::storage::Storage;

/// Repository for a vendor's sales/view/contact feed.
pub struct VendorStatsRepository<'a> {
    storage: &'a Storage,
}

impl<'a> VendorStatsRepository<'a> {
    /// Create a new vendor stats repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The vendor's feed, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn list(&self, pseudonym: &Pseudonym) -> Result<Vec<VendorStat>, RepositoryError> {
        Ok(self.storage.load_or_default(&keys::vendor_stats(pseudonym))?)
    }

    /// Append an entry to the vendor's feed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self, input), fields(kind = %input.kind))]
    pub fn add(
        &self,
        pseudonym: &Pseudonym,
        input: NewVendorStat,
    ) -> Result<VendorStat, RepositoryError> {
        let stat = VendorStat {
            id: StatId::generate(),
            kind: input.kind,
            description: input.description,
            amount: input.amount,
            currency: input.currency,
            timestamp: Utc::now(),
        };

        let mut stats = self.list(pseudonym)?;
        stats.push(stat.clone());
        self.storage.save(&keys::vendor_stats(pseudonym), &stats)?;

        debug!(stat_id = %stat.id, "vendor stat recorded");
        Ok(stat)
    }

    /// Delete one entry. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn delete(&self, pseudonym: &Pseudonym, id: &StatId) -> Result<bool, RepositoryError> {
        let mut stats = self.list(pseudonym)?;
        let before = stats.len();
        stats.retain(|s| &s.id != id);
        if stats.len() == before {
            return Ok(false);
        }
        self.storage.save(&keys::vendor_stats(pseudonym), &stats)?;
        Ok(true)
    }

    /// Drop the whole feed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn clear(&self, pseudonym: &Pseudonym) -> Result<(), RepositoryError> {
        self.storage.delete(&keys::vendor_stats(pseudonym))?;
        info!(vendor = %pseudonym, "vendor stats cleared");
        Ok(())
    }
}
