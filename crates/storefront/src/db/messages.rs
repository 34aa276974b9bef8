//! Vendor inbox repository.

use chrono::Utc;
use tracing::{info, instrument};

use anonshop_core::{MessageId, Pseudonym};

use super::{RepositoryError, keys};
use crate::models::{NewMessage, VendorMessage};
use crate::storage::Storage;

/// Repository for messages buyers send to vendors.
pub struct MessageRepository<'a> {
    storage: &'a Storage,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The vendor's inbox, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn list(&self, vendor: &Pseudonym) -> Result<Vec<VendorMessage>, RepositoryError> {
        Ok(self.storage.load_or_default(&keys::vendor_messages(vendor))?)
    }

    fn save(&self, vendor: &Pseudonym, messages: &[VendorMessage]) -> Result<(), RepositoryError> {
        self.storage
            .save(&keys::vendor_messages(vendor), messages)?;
        Ok(())
    }

    /// Deliver a message to `vendor`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the contact value or the
    /// message body is empty.
    #[instrument(skip(self, input), fields(method = %input.contact_method))]
    pub fn send(
        &self,
        vendor: &Pseudonym,
        input: NewMessage,
    ) -> Result<VendorMessage, RepositoryError> {
        let mut errors = Vec::new();
        if input.contact_value.trim().is_empty() {
            errors.push("contact value is required".to_owned());
        }
        if input.message.trim().is_empty() {
            errors.push("message is required".to_owned());
        }
        if !errors.is_empty() {
            return Err(RepositoryError::validation(&errors));
        }

        let message = VendorMessage {
            id: MessageId::generate(),
            contact_method: input.contact_method,
            contact_value: input.contact_value.trim().to_owned(),
            message: input.message.trim().to_owned(),
            timestamp: Utc::now(),
            read: false,
        };

        let mut messages = self.list(vendor)?;
        messages.push(message.clone());
        self.save(vendor, &messages)?;

        info!(vendor = %vendor, message_id = %message.id, "message delivered");
        Ok(message)
    }

    /// Mark a message as read. Returns whether the message exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn mark_read(&self, vendor: &Pseudonym, id: &MessageId) -> Result<bool, RepositoryError> {
        let mut messages = self.list(vendor)?;
        let Some(message) = messages.iter_mut().find(|m| &m.id == id) else {
            return Ok(false);
        };
        message.read = true;
        self.save(vendor, &messages)?;
        Ok(true)
    }

    /// Delete a message. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn delete(&self, vendor: &Pseudonym, id: &MessageId) -> Result<bool, RepositoryError> {
        let mut messages = self.list(vendor)?;
        let before = messages.len();
        messages.retain(|m| &m.id != id);
        if messages.len() == before {
            return Ok(false);
        }
        self.save(vendor, &messages)?;
        Ok(true)
    }

    /// Number of unread messages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn unread_count(&self, vendor: &Pseudonym) -> Result<usize, RepositoryError> {
        Ok(self.list(vendor)?.iter().filter(|m| !m.read).count())
    }
}
