//! Vendor registration code repository.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use anonshop_core::{Pseudonym, VendorCodeId};

use super::{RepositoryError, keys};
use crate::models::VendorCode;
use crate::random::{UPPER_ALNUM, random_string};
use crate::storage::Storage;

/// Prefix of every vendor registration code.
pub const CODE_PREFIX: &str = "VND-";

/// Number of random characters after [`CODE_PREFIX`].
pub const CODE_LENGTH: usize = 8;

/// Code totals for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CodeCounts {
    pub total: usize,
    pub used: usize,
    pub available: usize,
}

/// Repository for vendor registration codes.
pub struct VendorCodeRepository<'a> {
    storage: &'a Storage,
}

impl<'a> VendorCodeRepository<'a> {
    /// Create a new vendor code repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All codes, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn list(&self) -> Result<Vec<VendorCode>, RepositoryError> {
        Ok(self.storage.load_or_default(keys::VENDOR_CODES)?)
    }

    /// Generate `count` fresh unused codes and append them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn generate(&self, count: usize) -> Result<Vec<VendorCode>, RepositoryError> {
        let mut codes = self.list()?;
        let mut created = Vec::with_capacity(count);

        while created.len() < count {
            let code = format!("{CODE_PREFIX}{}", random_string(UPPER_ALNUM, CODE_LENGTH));
            if codes.iter().any(|c| c.code == code) {
                continue;
            }
            let entry = VendorCode {
                id: VendorCodeId::generate(),
                code,
                is_used: false,
                used_by: None,
                created_at: Utc::now(),
            };
            codes.push(entry.clone());
            created.push(entry);
        }

        self.storage.save(keys::VENDOR_CODES, &codes)?;
        info!(count, "vendor codes generated");
        Ok(created)
    }

    /// Delete a code by ID. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &VendorCodeId) -> Result<bool, RepositoryError> {
        let mut codes = self.list()?;
        let before = codes.len();
        codes.retain(|c| &c.id != id);
        if codes.len() == before {
            return Ok(false);
        }
        self.storage.save(keys::VENDOR_CODES, &codes)?;
        info!(code_id = %id, "vendor code deleted");
        Ok(true)
    }

    /// Consume an unused code on behalf of `pseudonym`.
    ///
    /// Codes are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such code exists, or
    /// `RepositoryError::Conflict` if it was already used.
    #[instrument(skip(self))]
    pub fn redeem(&self, code: &str, pseudonym: &Pseudonym) -> Result<VendorCode, RepositoryError> {
        let wanted = code.trim().to_ascii_uppercase();
        let mut codes = self.list()?;
        let entry = codes
            .iter_mut()
            .find(|c| c.code == wanted)
            .ok_or_else(|| RepositoryError::NotFound(format!("vendor code {wanted}")))?;

        if entry.is_used {
            return Err(RepositoryError::Conflict(format!(
                "vendor code {wanted} already used"
            )));
        }

        entry.is_used = true;
        entry.used_by = Some(pseudonym.clone());
        let redeemed = entry.clone();

        self.storage.save(keys::VENDOR_CODES, &codes)?;
        info!(vendor = %pseudonym, "vendor code redeemed");
        Ok(redeemed)
    }

    /// Total, used and available code counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn counts(&self) -> Result<CodeCounts, RepositoryError> {
        let codes = self.list()?;
        let used = codes.iter().filter(|c| c.is_used).count();
        Ok(CodeCounts {
            total: codes.len(),
            used,
            available: codes.len() - used,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let storage = Storage::in_memory();
        let repo = VendorCodeRepository::new(&storage);

        let codes = repo.generate(5).unwrap();
        assert_eq!(codes.len(), 5);
        for code in &codes {
            assert!(code.code.starts_with(CODE_PREFIX));
            let suffix = &code.code[CODE_PREFIX.len()..];
            assert_eq!(suffix.len(), CODE_LENGTH);
            assert!(suffix.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
            assert!(!code.is_used);
        }
        assert_eq!(repo.list().unwrap().len(), 5);
    }

    #[test]
    fn test_redeem_once() {
        let storage = Storage::in_memory();
        let repo = VendorCodeRepository::new(&storage);
        let vendor = Pseudonym::parse("music_anon").unwrap();
        let code = repo.generate(1).unwrap().remove(0);

        let redeemed = repo.redeem(&code.code.to_lowercase(), &vendor).unwrap();
        assert!(redeemed.is_used);
        assert_eq!(redeemed.used_by, Some(vendor.clone()));

        let err = repo.redeem(&code.code, &vendor).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let counts = repo.counts().unwrap();
        assert_eq!(counts, CodeCounts { total: 1, used: 1, available: 0 });
    }

    #[test]
    fn test_redeem_unknown_code() {
        let storage = Storage::in_memory();
        let repo = VendorCodeRepository::new(&storage);
        let vendor = Pseudonym::parse("music_anon").unwrap();
        assert!(matches!(
            repo.redeem("VND-NOTREAL0", &vendor).unwrap_err(),
            RepositoryError::NotFound(_)
        ));
    }

    #[test]
    fn test_delete() {
        let storage = Storage::in_memory();
        let repo = VendorCodeRepository::new(&storage);
        let code = repo.generate(2).unwrap().remove(0);

        assert!(repo.delete(&code.id).unwrap());
        assert!(!repo.delete(&code.id).unwrap());
        assert_eq!(repo.counts().unwrap().total, 1);
    }
}
