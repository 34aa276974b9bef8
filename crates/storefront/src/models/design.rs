//! Marketplace look-and-feel settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use anonshop_core::Theme;

/// Admin-configurable design settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSettings {
    pub logo: String,
    pub theme: Theme,
    pub background: String,
    #[serde(default)]
    pub custom_texts: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_images: BTreeMap<String, String>,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            logo: "/logo.png".to_owned(),
            theme: Theme::Default,
            background: String::new(),
            custom_texts: BTreeMap::new(),
            custom_images: BTreeMap::new(),
        }
    }
}

/// Partial update merged over the current settings.
#[derive(Debug, Clone, Default)]
pub struct DesignUpdate {
    pub logo: Option<String>,
    pub theme: Option<Theme>,
    pub background: Option<String>,
    pub custom_texts: Option<BTreeMap<String, String>>,
    pub custom_images: Option<BTreeMap<String, String>>,
}

impl DesignUpdate {
    pub(crate) fn apply(self, settings: &mut DesignSettings) {
        if let Some(logo) = self.logo {
            settings.logo = logo;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(background) = self.background {
            settings.background = background;
        }
        if let Some(texts) = self.custom_texts {
            settings.custom_texts = texts;
        }
        if let Some(images) = self.custom_images {
            settings.custom_images = images;
        }
    }
}
