//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input is empty after trimming.
    #[error("username cannot be empty")]
    Empty,
    /// The input is longer than the allowed maximum.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_.-]`.
    #[error("username contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A login name.
///
/// Surrounding whitespace is trimmed. Only ASCII letters, digits, `_`, `.`
/// and `-` are accepted so names are safe to show anywhere.
///
/// ```
/// use teahouse_core::Username;
///
/// assert_eq!(Username::parse("  leaf_lover ").unwrap().as_str(), "leaf_lover");
/// assert!(Username::parse("").is_err());
/// assert!(Username::parse("two words").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, too long, or contains
    /// a disallowed character.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            return Err(UsernameError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Username::parse("oolong").is_ok());
        assert!(Username::parse("green.tea-fan_2").is_ok());
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!(Username::parse("\tsencha\n").unwrap().as_str(), "sencha");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(Username::MAX_LENGTH + 1);
        assert_eq!(
            Username::parse(&long),
            Err(UsernameError::TooLong {
                max: Username::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            Username::parse("tea@home"),
            Err(UsernameError::InvalidCharacter('@'))
        );
    }
}
