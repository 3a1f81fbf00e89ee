//! Swiss postal code (NPA) type.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostalCodeError {
    /// Fewer than four digits have been typed so far.
    #[error("postal code must have 4 digits (got {0})")]
    Incomplete(usize),
    /// More than four characters.
    #[error("postal code must have exactly 4 digits")]
    TooLong,
    /// A non-digit character.
    #[error("postal code may only contain digits")]
    NonDigit,
    /// Swiss postal codes never start with 0.
    #[error("postal code cannot start with 0")]
    LeadingZero,
}

/// A 4-digit Swiss postal code.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(into = "String")]
pub struct PostalCode([u8; 4]);

impl PostalCode {
    /// Parse a postal code. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`PostalCodeError`] unless the input is exactly 4 digits.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let trimmed = s.trim();
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PostalCodeError::NonDigit);
        }
        let bytes: [u8; 4] = match trimmed.len() {
            n if n < 4 => return Err(PostalCodeError::Incomplete(n)),
            4 => trimmed
                .as_bytes()
                .try_into()
                .map_err(|_| PostalCodeError::TooLong)?,
            _ => return Err(PostalCodeError::TooLong),
        };
        if bytes[0] == b'0' {
            return Err(PostalCodeError::LeadingZero);
        }
        Ok(Self(bytes))
    }

    /// Returns the postal code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Numeric value, e.g. `1260`.
    #[must_use]
    pub fn value(&self) -> u16 {
        self.0
            .iter()
            .fold(0_u16, |acc, b| acc * 10 + u16::from(b - b'0'))
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.as_str().to_owned()
    }
}

impl<'de> Deserialize<'de> for PostalCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Classification of what a customer has typed into the postal-code field.
///
/// Lookups are only worth making for [`PostalCodeInput::Complete`]; partial
/// input is expected while typing and is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostalCodeInput {
    /// Nothing typed.
    Empty,
    /// A prefix of digits shorter than 4.
    Partial,
    /// A valid 4-digit postal code.
    Complete(PostalCode),
    /// Something that can never become a postal code.
    Invalid(PostalCodeError),
}

impl PostalCodeInput {
    /// Classify raw field input.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::Empty;
        }
        match PostalCode::parse(raw) {
            Ok(code) => Self::Complete(code),
            Err(PostalCodeError::Incomplete(_)) => Self::Partial,
            Err(e) => Self::Invalid(e),
        }
    }

    /// The complete postal code, if any.
    #[must_use]
    pub const fn complete(self) -> Option<PostalCode> {
        match self {
            Self::Complete(code) => Some(code),
            _ => None,
        }
    }
}
