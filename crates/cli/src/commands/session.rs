//! Session commands.

use clap::Subcommand;
use tracing::info;

use anonshop_storefront::db::SessionRepository;
use anonshop_storefront::state::AppState;

use super::CliError;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session under a pseudonym
    Login {
        /// 3-20 characters: letters, digits, underscore
        pseudonym: String,
    },
    /// End the active session
    Logout,
    /// Show the active session
    Whoami,
}

/// Run a session command.
///
/// # Errors
///
/// Returns an error if the pseudonym is invalid or storage fails.
pub fn run(state: &AppState, action: SessionAction) -> Result<(), CliError> {
    let sessions = SessionRepository::new(state.storage());

    match action {
        SessionAction::Login { pseudonym } => {
            let session = sessions.create(&pseudonym)?;
            info!(pseudonym = %session.pseudonym, "Logged in");
        }
        SessionAction::Logout => {
            sessions.destroy()?;
            info!("Logged out");
        }
        SessionAction::Whoami => match sessions.current()? {
            Some(session) => info!(
                pseudonym = %session.pseudonym,
                since = %session.created_at,
                "Active session"
            ),
            None => info!("No active session"),
        },
    }
    Ok(())
}
