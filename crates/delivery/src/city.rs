//! City lookup results.
//!
//! The delivery-zone service answers `GET /api/delivery/cities/{postalCode}`
//! for postal codes inside the Coppet–Lausanne corridor and 404 otherwise.
//! [`corridor_city`] is a built-in copy of that list, used when the service
//! is not configured.

use lemanshop_core::PostalCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A postal code resolved to a served city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityLookupResult {
    pub name: String,
    pub postal_code: PostalCode,
    #[serde(default)]
    pub zone_id: Option<String>,
    /// Human-readable zone name, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Cart total above which delivery is free. Always 0 today.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub free_threshold: Decimal,
}

/// What a postal-code lookup produced.
///
/// `NotServed` is a definitive answer from the service; `Unavailable` means
/// the service could not be asked. Eligibility treats both the same way (the
/// conservative "other region" rule), but only `NotServed` may be cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Resolved(CityLookupResult),
    NotServed,
    Unavailable,
}

impl LookupOutcome {
    /// The resolved city, if any.
    #[must_use]
    pub const fn city(&self) -> Option<&CityLookupResult> {
        match self {
            Self::Resolved(city) => Some(city),
            Self::NotServed | Self::Unavailable => None,
        }
    }

    /// Whether the outcome is a definitive answer.
    #[must_use]
    pub const fn is_definitive(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Postal codes of the Coppet–Lausanne corridor: (code, city, zone).
const CORRIDOR: &[(u16, &str, &str)] = &[
    // Terre Sainte
    (1279, "Chavannes-de-Bogis", "terre-sainte"),
    (1291, "Commugny", "terre-sainte"),
    (1295, "Mies", "terre-sainte"),
    (1296, "Coppet", "terre-sainte"),
    (1297, "Founex", "terre-sainte"),
    // Nyon and La Côte
    (1180, "Rolle", "la-cote"),
    (1185, "Mont-sur-Rolle", "la-cote"),
    (1195, "Dully", "la-cote"),
    (1196, "Gland", "la-cote"),
    (1197, "Prangins", "la-cote"),
    (1260, "Nyon", "la-cote"),
    (1261, "Le Vaud", "la-cote"),
    (1262, "Eysins", "la-cote"),
    (1263, "Crassier", "la-cote"),
    (1266, "Duillier", "la-cote"),
    (1267, "Vich", "la-cote"),
    (1268, "Begnins", "la-cote"),
    (1270, "Trélex", "la-cote"),
    // Morges and the western Lausanne suburbs
    (1008, "Prilly", "morges"),
    (1020, "Renens", "morges"),
    (1024, "Ecublens", "morges"),
    (1025, "Saint-Sulpice", "morges"),
    (1027, "Lonay", "morges"),
    (1028, "Préverenges", "morges"),
    (1110, "Morges", "morges"),
    (1162, "Saint-Prex", "morges"),
    (1163, "Etoy", "morges"),
    (1164, "Buchillon", "morges"),
    (1165, "Allaman", "morges"),
    // Lausanne
    (1003, "Lausanne", "lausanne"),
    (1004, "Lausanne", "lausanne"),
    (1005, "Lausanne", "lausanne"),
    (1006, "Lausanne", "lausanne"),
    (1007, "Lausanne", "lausanne"),
    (1009, "Pully", "lausanne"),
    (1010, "Lausanne", "lausanne"),
    (1011, "Lausanne", "lausanne"),
    (1012, "Lausanne", "lausanne"),
    (1015, "Lausanne", "lausanne"),
    (1018, "Lausanne", "lausanne"),
];

/// Look up a postal code in the built-in corridor directory.
#[must_use]
pub fn corridor_city(postal_code: PostalCode) -> Option<CityLookupResult> {
    let value = postal_code.value();
    CORRIDOR
        .iter()
        .find(|(code, _, _)| *code == value)
        .map(|(_, name, zone)| CityLookupResult {
            name: (*name).to_owned(),
            postal_code,
            zone_id: Some((*zone).to_owned()),
            zone: None,
            free_threshold: Decimal::ZERO,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn code(s: &str) -> PostalCode {
        PostalCode::parse(s).unwrap()
    }

    #[test]
    fn test_corridor_lookup() {
        let city = corridor_city(code("1296")).unwrap();
        assert_eq!(city.name, "Coppet");
        assert_eq!(city.zone_id.as_deref(), Some("terre-sainte"));
        assert_eq!(city.free_threshold, Decimal::ZERO);

        assert!(corridor_city(code("1260")).is_some());
        assert!(corridor_city(code("1261")).is_some());
    }

    #[test]
    fn test_outside_corridor() {
        // Yverdon, Montreux, Geneva
        assert!(corridor_city(code("1400")).is_none());
        assert!(corridor_city(code("1820")).is_none());
        assert!(corridor_city(code("1201")).is_none());
    }

    #[test]
    fn test_corridor_has_no_duplicates() {
        let mut codes: Vec<u16> = CORRIDOR.iter().map(|(c, _, _)| *c).collect();
        codes.sort_unstable();
        let before = codes.len();
        codes.dedup();
        assert_eq!(before, codes.len());
    }

    #[test]
    fn test_deserialize_service_payload() {
        let json = r#"{"name":"Nyon","postalCode":"1260","zoneId":"z-2","zone":"La Côte","freeThreshold":0}"#;
        let city: CityLookupResult = serde_json::from_str(json).unwrap();
        assert_eq!(city.postal_code, code("1260"));
        assert_eq!(city.zone.as_deref(), Some("La Côte"));

        let minimal: CityLookupResult =
            serde_json::from_str(r#"{"name":"Nyon","postalCode":"1260"}"#).unwrap();
        assert_eq!(minimal.zone_id, None);
        assert_eq!(minimal.free_threshold, Decimal::ZERO);
    }

    #[test]
    fn test_lookup_outcome() {
        let resolved = LookupOutcome::Resolved(corridor_city(code("1110")).unwrap());
        assert!(resolved.city().is_some());
        assert!(resolved.is_definitive());
        assert!(LookupOutcome::NotServed.is_definitive());
        assert!(!LookupOutcome::Unavailable.is_definitive());
        assert!(LookupOutcome::Unavailable.city().is_none());
    }
}
