//! Interactive captcha challenge.

use std::io::{self, BufRead};

use tracing::{info, warn};

use anonshop_storefront::services::{CaptchaChallenge, CaptchaError};
use anonshop_storefront::state::AppState;

use super::CliError;

/// Show codes and read answers from stdin until one matches.
///
/// # Errors
///
/// Returns `CaptchaError::CoolingDown` once too many answers were wrong, or
/// an I/O error if stdin closes.
pub fn run(state: &AppState) -> Result<(), CliError> {
    let mut challenge = CaptchaChallenge::new(state.config().captcha);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        info!(code = %challenge.code(), "Type the code shown");
        let answer = lines
            .next()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))??;

        match challenge.verify(&answer) {
            Ok(()) => {
                info!("Captcha solved");
                return Ok(());
            }
            Err(CaptchaError::Mismatch { remaining_attempts }) => {
                warn!(remaining_attempts, "Wrong code, new one generated");
            }
            Err(e @ CaptchaError::CoolingDown { .. }) => return Err(e.into()),
        }
    }
}
