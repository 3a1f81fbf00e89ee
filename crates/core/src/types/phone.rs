//! Phone number type, normalised to E.164.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input is empty after removing separators.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains characters other than digits, separators and a leading +.
    #[error("phone number may only contain digits, spaces, dashes, dots and a leading +")]
    InvalidCharacters,
    /// A Swiss number does not have 9 digits after the prefix.
    #[error("Swiss phone numbers have 9 digits after the leading 0")]
    InvalidSwissLength,
    /// An international number is outside the E.164 length range.
    #[error("international phone numbers have between 8 and 15 digits")]
    InvalidLength,
}

/// A phone number in E.164 form (`+41791234567`).
///
/// Swiss national numbers (`079 123 45 67`) and the `0041` prefix are
/// rewritten to `+41`. Other international numbers are accepted as long as
/// they start with `+` and have 8-15 digits.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    const SWISS_PREFIX: &'static str = "41";
    const SWISS_NATIONAL_DIGITS: usize = 9;

    /// Parse and normalise a phone number.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] when the input cannot be read as a phone number.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        let (international, rest) = trimmed
            .strip_prefix('+')
            .map_or((false, trimmed), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '/' | '(' | ')' => {}
                _ => return Err(PhoneError::InvalidCharacters),
            }
        }

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        let international_digits = if international {
            digits
        } else if let Some(rest) = digits.strip_prefix("00") {
            rest.to_owned()
        } else if let Some(national) = digits.strip_prefix('0') {
            if national.len() != Self::SWISS_NATIONAL_DIGITS {
                return Err(PhoneError::InvalidSwissLength);
            }
            format!("{}{national}", Self::SWISS_PREFIX)
        } else {
            return Err(PhoneError::InvalidLength);
        };

        if let Some(national) = international_digits.strip_prefix(Self::SWISS_PREFIX) {
            // +41 0xx is a common typo for +41 xx
            let national = national.strip_prefix('0').unwrap_or(national);
            if national.len() != Self::SWISS_NATIONAL_DIGITS {
                return Err(PhoneError::InvalidSwissLength);
            }
            return Ok(Self(format!("+{}{national}", Self::SWISS_PREFIX)));
        }

        if !(8..=15).contains(&international_digits.len()) {
            return Err(PhoneError::InvalidLength);
        }

        Ok(Self(format!("+{international_digits}")))
    }

    /// Returns the E.164 representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a Swiss (+41) number.
    #[must_use]
    pub fn is_swiss(&self) -> bool {
        self.0.starts_with("+41")
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Phone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_swiss_national_number() {
        let phone = Phone::parse("079 123 45 67").unwrap();
        assert_eq!(phone.as_str(), "+41791234567");
        assert!(phone.is_swiss());
    }

    #[test]
    fn test_swiss_prefix_variants() {
        assert_eq!(Phone::parse("0041 21 345 67 89").unwrap().as_str(), "+41213456789");
        assert_eq!(Phone::parse("+41 (0)21 345 67 89").unwrap().as_str(), "+41213456789");
        assert_eq!(Phone::parse("+41-79-123-45-67").unwrap().as_str(), "+41791234567");
    }

    #[test]
    fn test_foreign_number() {
        let phone = Phone::parse("+33 6 12 34 56 78").unwrap();
        assert_eq!(phone.as_str(), "+33612345678");
        assert!(!phone.is_swiss());
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("079 abc"), Err(PhoneError::InvalidCharacters));
        assert_eq!(Phone::parse("079 123 45"), Err(PhoneError::InvalidSwissLength));
        assert_eq!(Phone::parse("+41 79 123"), Err(PhoneError::InvalidSwissLength));
        assert_eq!(Phone::parse("+1 234"), Err(PhoneError::InvalidLength));
        assert_eq!(Phone::parse("791234567"), Err(PhoneError::InvalidLength));
    }
}
