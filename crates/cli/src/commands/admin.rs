//! Marketplace administration: design settings and vendor licenses.

use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::info;

use anonshop_core::Theme;
use anonshop_storefront::db::{DesignRepository, LicenseRepository};
use anonshop_storefront::error::AppError;
use anonshop_storefront::models::{DesignSettings, VendorLicense};
use anonshop_storefront::state::AppState;

use super::CliError;

#[derive(Subcommand)]
pub enum DesignAction {
    /// Show the current design
    Show,
    /// Set the logo
    Logo { logo: String },
    /// Set the background
    Background { background: String },
    /// Set the colour theme (default, neon, minimal, cyberpunk)
    Theme { theme: Theme },
    /// Set a custom text slot
    Text { key: String, value: String },
    /// Set a custom image slot
    Image { key: String, url: String },
    /// Restore the default design
    Reset,
}

#[derive(Subcommand)]
pub enum LicenseAction {
    /// Show the current license fee
    Fee,
    /// Change the license fee for new applications
    SetFee { fee: Decimal },
    /// Apply for a vendor license
    Apply { username: String },
    /// List all applications
    List,
    /// Show one application
    Show { id: String },
    /// Record the payment of an application
    Pay { id: String, tx_hash: String },
    /// Approve a paid application
    Approve { id: String },
}

fn log_design(design: &DesignSettings) {
    info!(
        logo = %design.logo,
        theme = %design.theme,
        background = %design.background,
        texts = design.custom_texts.len(),
        images = design.custom_images.len(),
        "Design"
    );
}

fn log_license(license: &VendorLicense) {
    info!(
        id = %license.id,
        username = %license.username,
        fee = %license.fee,
        status = %license.status,
        tx_hash = license.tx_hash.as_deref().unwrap_or("-"),
        "License"
    );
}

/// Run a design command.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn design(state: &AppState, action: DesignAction) -> Result<(), CliError> {
    let designs = DesignRepository::new(state.storage());

    let design = match action {
        DesignAction::Show => designs.get()?,
        DesignAction::Logo { logo } => designs.set_logo(&logo)?,
        DesignAction::Background { background } => designs.set_background(&background)?,
        DesignAction::Theme { theme } => designs.set_theme(theme)?,
        DesignAction::Text { key, value } => designs.set_custom_text(&key, &value)?,
        DesignAction::Image { key, url } => designs.set_custom_image(&key, &url)?,
        DesignAction::Reset => designs.reset()?,
    };
    log_design(&design);
    Ok(())
}

/// Run a license command.
///
/// # Errors
///
/// Returns an error if the username is taken, the application is in the
/// wrong state, or storage fails.
pub fn license(state: &AppState, action: LicenseAction) -> Result<(), CliError> {
    let licenses = LicenseRepository::new(state.storage());

    match action {
        LicenseAction::Fee => {
            let fee = licenses.fee()?;
            info!(fee = %fee, "License fee");
        }
        LicenseAction::SetFee { fee } => {
            licenses.set_fee(fee)?;
            info!(fee = %fee, "License fee updated");
        }
        LicenseAction::Apply { username } => log_license(&licenses.apply(&username)?),
        LicenseAction::List => licenses.list()?.iter().for_each(log_license),
        LicenseAction::Show { id } => {
            let license = licenses
                .get(&id)?
                .ok_or_else(|| AppError::NotFound(format!("license {id}")))?;
            log_license(&license);
        }
        LicenseAction::Pay { id, tx_hash } => log_license(&licenses.mark_paid(&id, &tx_hash)?),
        LicenseAction::Approve { id } => log_license(&licenses.approve(&id)?),
    }
    Ok(())
}
