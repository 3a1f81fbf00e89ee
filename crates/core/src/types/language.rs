//! Customer-facing language.

use serde::{Deserialize, Serialize};

/// Languages the storefront is translated into.
///
/// The client stores its choice under `i18nextLng`, which may carry a region
/// (`fr-CH`, `de_CH`). Only the primary subtag matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French (the shop's home language).
    #[default]
    Fr,
    /// German.
    De,
    /// English.
    En,
}

impl Language {
    /// Parse a language tag; returns `None` for unsupported languages.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "fr" => Some(Self::Fr),
            "de" => Some(Self::De),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Parse a tag, falling back to the default language.
    #[must_use]
    pub fn from_tag_or_default(tag: Option<&str>) -> Self {
        tag.and_then(Self::from_tag).unwrap_or_default()
    }

    /// Two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::De => "de",
            Self::En => "en",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Language::from_tag("fr-CH"), Some(Language::Fr));
        assert_eq!(Language::from_tag("DE_ch"), Some(Language::De));
        assert_eq!(Language::from_tag("en"), Some(Language::En));
        assert_eq!(Language::from_tag("it"), None);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(Language::from_tag_or_default(None), Language::Fr);
        assert_eq!(Language::from_tag_or_default(Some("rm")), Language::Fr);
        assert_eq!(Language::from_tag_or_default(Some("en-GB")), Language::En);
    }
}
