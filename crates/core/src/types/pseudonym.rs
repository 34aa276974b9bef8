//! Pseudonym type.
//!
//! A pseudonym is the only identity primitive in anonshop: vendors and buyers
//! pick a display handle and everything they own is keyed by it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pseudonym`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PseudonymError {
    /// The input string is empty or only whitespace.
    #[error("pseudonym is required")]
    Empty,
    /// The input string is too short.
    #[error("pseudonym must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input string is too long.
    #[error("pseudonym must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_]`.
    #[error("pseudonym can only contain letters, numbers, and underscores")]
    InvalidCharacter(char),
}

/// A vendor or buyer pseudonym.
///
/// ## Constraints
///
/// - Length: 3-20 characters
/// - Characters: ASCII letters, digits and underscore
///
/// ## Examples
///
/// ```
/// use anonshop_core::Pseudonym;
///
/// assert!(Pseudonym::parse("crypto_dealer").is_ok());
/// assert!(Pseudonym::parse("ab").is_err());               // too short
/// assert!(Pseudonym::parse("has space").is_err());        // invalid character
/// assert!(Pseudonym::parse("a_very_long_pseudonym_1").is_err()); // too long
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Pseudonym(String);

impl Pseudonym {
    /// Minimum length of a pseudonym.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length of a pseudonym.
    pub const MAX_LENGTH: usize = 20;

    /// Parse a `Pseudonym` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, shorter than 3 or longer than
    /// 20 characters, or contains anything other than ASCII letters, digits
    /// and underscores.
    pub fn parse(s: &str) -> Result<Self, PseudonymError> {
        if s.trim().is_empty() {
            return Err(PseudonymError::Empty);
        }

        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(PseudonymError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(PseudonymError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(PseudonymError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Wrap a pseudonym read back from storage without re-validating it.
    ///
    /// Stored records predate any validation change, so they are trusted as-is.
    #[must_use]
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the pseudonym as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Pseudonym` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Pseudonym {
    type Err = PseudonymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pseudonym {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Pseudonym {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
