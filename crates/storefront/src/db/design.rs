//! Marketplace design settings repository.

use tracing::{info, instrument};

use anonshop_core::Theme;

use super::{RepositoryError, keys};
use crate::models::{DesignSettings, DesignUpdate};
use crate::storage::Storage;

/// Repository for the admin-configured look and feel.
pub struct DesignRepository<'a> {
    storage: &'a Storage,
}

impl<'a> DesignRepository<'a> {
    /// Create a new design repository.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Current settings, or the defaults if none are stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn get(&self) -> Result<DesignSettings, RepositoryError> {
        Ok(self.storage.load_or_default(keys::DESIGN)?)
    }

    /// Merge `update` over the current settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self, update))]
    pub fn update(&self, update: DesignUpdate) -> Result<DesignSettings, RepositoryError> {
        let mut settings = self.get()?;
        update.apply(&mut settings);
        self.storage.save(keys::DESIGN, &settings)?;
        info!(theme = %settings.theme, "design settings updated");
        Ok(settings)
    }

    /// Replace the logo URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_logo(&self, logo: &str) -> Result<DesignSettings, RepositoryError> {
        self.update(DesignUpdate {
            logo: Some(logo.to_owned()),
            ..DesignUpdate::default()
        })
    }

    /// Replace the page background (colour or image URL).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_background(&self, background: &str) -> Result<DesignSettings, RepositoryError> {
        self.update(DesignUpdate {
            background: Some(background.to_owned()),
            ..DesignUpdate::default()
        })
    }

    /// Switch the theme.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_theme(&self, theme: Theme) -> Result<DesignSettings, RepositoryError> {
        self.update(DesignUpdate {
            theme: Some(theme),
            ..DesignUpdate::default()
        })
    }

    /// Set or replace one custom text snippet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_custom_text(&self, key: &str, value: &str) -> Result<DesignSettings, RepositoryError> {
        let mut texts = self.get()?.custom_texts;
        texts.insert(key.to_owned(), value.to_owned());
        self.update(DesignUpdate {
            custom_texts: Some(texts),
            ..DesignUpdate::default()
        })
    }

    /// Set or replace one custom image URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn set_custom_image(&self, key: &str, url: &str) -> Result<DesignSettings, RepositoryError> {
        let mut images = self.get()?.custom_images;
        images.insert(key.to_owned(), url.to_owned());
        self.update(DesignUpdate {
            custom_images: Some(images),
            ..DesignUpdate::default()
        })
    }

    /// Drop all customisation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Result<DesignSettings, RepositoryError> {
        self.storage.delete(keys::DESIGN)?;
        info!("design settings reset");
        Ok(DesignSettings::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let storage = Storage::in_memory();
        let settings = DesignRepository::new(&storage).get().unwrap();
        assert_eq!(settings.logo, "/logo.png");
        assert_eq!(settings.theme, Theme::Default);
    }

    #[test]
    fn test_partial_updates_merge() {
        let storage = Storage::in_memory();
        let repo = DesignRepository::new(&storage);

        repo.set_theme(Theme::Cyberpunk).unwrap();
        repo.set_background("#101010").unwrap();
        repo.set_custom_text("hero", "Welcome").unwrap();
        let settings = repo
            .update(DesignUpdate {
                logo: Some("/custom.png".to_owned()),
                ..DesignUpdate::default()
            })
            .unwrap();

        assert_eq!(settings.theme, Theme::Cyberpunk);
        assert_eq!(settings.logo, "/custom.png");
        assert_eq!(settings.background, "#101010");
        assert_eq!(settings.custom_texts["hero"], "Welcome");

        assert_eq!(repo.reset().unwrap(), DesignSettings::default());
        assert_eq!(repo.get().unwrap(), DesignSettings::default());
    }
}
