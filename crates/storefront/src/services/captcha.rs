//! Human-verification captcha shown before sensitive forms.
//!
//! Six characters from `A-Z0-9`, compared case-insensitively. Every miss
//! draws a new code, and too many misses in a row lock the challenge for a
//! cooldown period. This is a speed bump, not a security boundary.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CaptchaConfig;
use crate::random::{UPPER_ALNUM, random_string};

/// Length of a captcha code.
pub const CAPTCHA_LENGTH: usize = 6;

/// Captcha verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptchaError {
    /// The answer didn't match; a new code has been drawn.
    #[error("captcha answer incorrect ({remaining_attempts} attempts left)")]
    Mismatch { remaining_attempts: u32 },

    /// Too many misses; answers are refused until the cooldown ends.
    #[error("too many attempts, try again in {remaining_secs}s")]
    CoolingDown { remaining_secs: u64 },
}

/// A single captcha challenge and its attempt counter.
#[derive(Debug, Clone)]
pub struct CaptchaChallenge {
    code: String,
    misses: u32,
    locked_until: Option<Instant>,
    config: CaptchaConfig,
}

impl CaptchaChallenge {
    /// Draw a fresh challenge.
    #[must_use]
    pub fn new(config: CaptchaConfig) -> Self {
        Self {
            code: random_string(UPPER_ALNUM, CAPTCHA_LENGTH),
            misses: 0,
            locked_until: None,
            config,
        }
    }

    /// The code to display.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Draw a new code without touching the attempt counter.
    pub fn regenerate(&mut self) {
        self.code = random_string(UPPER_ALNUM, CAPTCHA_LENGTH);
    }

    /// Check `input` against the current code.
    ///
    /// # Errors
    ///
    /// Returns `CaptchaError::Mismatch` on a wrong answer, or
    /// `CaptchaError::CoolingDown` while locked out.
    pub fn verify(&mut self, input: &str) -> Result<(), CaptchaError> {
        self.verify_at(input, Instant::now())
    }

    /// [`Self::verify`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// Same as [`Self::verify`].
    pub fn verify_at(&mut self, input: &str, now: Instant) -> Result<(), CaptchaError> {
        if let Some(until) = self.locked_until {
            if now < until {
                return Err(CaptchaError::CoolingDown {
                    remaining_secs: ceil_secs(until - now),
                });
            }
            self.locked_until = None;
        }

        if input.trim().eq_ignore_ascii_case(&self.code) {
            debug!("captcha solved");
            self.misses = 0;
            return Ok(());
        }

        self.misses += 1;
        self.regenerate();

        if self.misses >= self.config.max_attempts {
            warn!(misses = self.misses, "captcha locked");
            self.misses = 0;
            self.locked_until = Some(now + self.config.cooldown);
            return Err(CaptchaError::CoolingDown {
                remaining_secs: ceil_secs(self.config.cooldown),
            });
        }

        Err(CaptchaError::Mismatch {
            remaining_attempts: self.config.max_attempts - self.misses,
        })
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
