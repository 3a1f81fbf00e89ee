//! Localised customer-facing texts for the delivery rules.

use chrono::{Datelike, NaiveDate, Weekday};
use lemanshop_core::{DeliveryType, Language, Price};

use crate::eligibility::{EligibilityReason, Region};

/// Message shown next to the delivery options.
#[must_use]
pub fn eligibility(
    reason: &EligibilityReason,
    minimum: Price,
    missing: Price,
    language: Language,
) -> String {
    match (language, reason) {
        (Language::Fr, EligibilityReason::Pickup) => {
            "Retrait gratuit, sans minimum de commande.".to_owned()
        }
        (Language::De, EligibilityReason::Pickup) => {
            "Kostenlose Abholung, ohne Mindestbestellwert.".to_owned()
        }
        (Language::En, EligibilityReason::Pickup) => {
            "Free pickup, no minimum order.".to_owned()
        }
        (Language::Fr, EligibilityReason::RailwayStation) => {
            "Livraison gratuite en gare, sans minimum de commande.".to_owned()
        }
        (Language::De, EligibilityReason::RailwayStation) => {
            "Kostenlose Lieferung an den Bahnhof, ohne Mindestbestellwert.".to_owned()
        }
        (Language::En, EligibilityReason::RailwayStation) => {
            "Free delivery to the railway station, no minimum order.".to_owned()
        }
        (Language::Fr, EligibilityReason::Corridor { city }) => {
            format!("Livraison gratuite à {city}, sans minimum de commande.")
        }
        (Language::De, EligibilityReason::Corridor { city }) => {
            format!("Kostenlose Lieferung nach {city}, ohne Mindestbestellwert.")
        }
        (Language::En, EligibilityReason::Corridor { city }) => {
            format!("Free delivery to {city}, no minimum order.")
        }
        (Language::Fr, EligibilityReason::MinimumReached { .. }) => {
            format!("Livraison gratuite : minimum de commande de {minimum} atteint.")
        }
        (Language::De, EligibilityReason::MinimumReached { .. }) => {
            format!("Kostenlose Lieferung: Mindestbestellwert von {minimum} erreicht.")
        }
        (Language::En, EligibilityReason::MinimumReached { .. }) => {
            format!("Free delivery: minimum order of {minimum} reached.")
        }
        (Language::Fr, EligibilityReason::BelowMinimum { region }) => format!(
            "Minimum de commande de {minimum} pour la livraison {}. Il manque {missing}.",
            region_fr(*region)
        ),
        (Language::De, EligibilityReason::BelowMinimum { region }) => format!(
            "Mindestbestellwert von {minimum} für die Lieferung {}. Es fehlen {missing}.",
            region_de(*region)
        ),
        (Language::En, EligibilityReason::BelowMinimum { region }) => format!(
            "A minimum order of {minimum} is required for delivery {}. Add {missing} more.",
            region_en(*region)
        ),
        (Language::Fr, EligibilityReason::UnknownDeliveryType) => {
            "Type de livraison inconnu.".to_owned()
        }
        (Language::De, EligibilityReason::UnknownDeliveryType) => {
            "Unbekannte Lieferart.".to_owned()
        }
        (Language::En, EligibilityReason::UnknownDeliveryType) => {
            "Please choose a delivery option: unknown delivery type.".to_owned()
        }
    }
}

const fn region_fr(region: Region) -> &'static str {
    match region {
        Region::Geneva => "à Genève",
        Region::OtherVaud => "dans cette région du canton de Vaud",
        Region::Unspecified => "à domicile",
    }
}

const fn region_de(region: Region) -> &'static str {
    match region {
        Region::Geneva => "nach Genf",
        Region::OtherVaud => "in diese Region des Kantons Waadt",
        Region::Unspecified => "nach Hause",
    }
}

const fn region_en(region: Region) -> &'static str {
    match region {
        Region::Geneva => "to Geneva",
        Region::OtherVaud => "to this part of the canton of Vaud",
        Region::Unspecified => "to your address",
    }
}

/// Label of a delivery type.
#[must_use]
pub const fn delivery_type_label(delivery_type: DeliveryType, language: Language) -> &'static str {
    match (language, delivery_type) {
        (Language::Fr, DeliveryType::Pickup) => "Retrait sur place",
        (Language::Fr, DeliveryType::Address) => "Livraison à domicile",
        (Language::Fr, DeliveryType::RailwayStation) => "Livraison en gare",
        (Language::De, DeliveryType::Pickup) => "Abholung vor Ort",
        (Language::De, DeliveryType::Address) => "Lieferung nach Hause",
        (Language::De, DeliveryType::RailwayStation) => "Lieferung an den Bahnhof",
        (Language::En, DeliveryType::Pickup) => "Pickup",
        (Language::En, DeliveryType::Address) => "Home delivery",
        (Language::En, DeliveryType::RailwayStation) => "Railway station delivery",
    }
}

/// Weekday names, Sunday first (matching `dayOfWeek` 0-6).
#[must_use]
pub const fn weekday_names(language: Language) -> [&'static str; 7] {
    match language {
        Language::Fr => [
            "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
        ],
        Language::De => [
            "Sonntag",
            "Montag",
            "Dienstag",
            "Mittwoch",
            "Donnerstag",
            "Freitag",
            "Samstag",
        ],
        Language::En => [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ],
    }
}

/// Month names, January first.
#[must_use]
pub const fn month_names(language: Language) -> [&'static str; 12] {
    match language {
        Language::Fr => [
            "janvier",
            "février",
            "mars",
            "avril",
            "mai",
            "juin",
            "juillet",
            "août",
            "septembre",
            "octobre",
            "novembre",
            "décembre",
        ],
        Language::De => [
            "Januar",
            "Februar",
            "März",
            "April",
            "Mai",
            "Juni",
            "Juli",
            "August",
            "September",
            "Oktober",
            "November",
            "Dezember",
        ],
        Language::En => [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ],
    }
}

/// Long date label, e.g. `samedi 17 octobre` / `Saturday, 17 October`.
#[must_use]
pub fn date_label(date: NaiveDate, language: Language) -> String {
    let weekday = weekday_name(date.weekday(), language);
    let month = month_names(language)
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    match language {
        Language::Fr => format!("{weekday} {} {month}", date.day()),
        Language::De => format!("{weekday}, {}. {month}", date.day()),
        Language::En => format!("{weekday}, {} {month}", date.day()),
    }
}

fn weekday_name(weekday: Weekday, language: Language) -> &'static str {
    weekday_names(language)
        .get(weekday.num_days_from_sunday() as usize)
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_below_minimum_mentions_amounts() {
        let reason = EligibilityReason::BelowMinimum {
            region: Region::OtherVaud,
        };
        for language in [Language::Fr, Language::De, Language::En] {
            let text = eligibility(
                &reason,
                Price::chf(Decimal::from(200)),
                Price::chf(Decimal::new(5050, 2)),
                language,
            );
            assert!(text.contains("200.00 CHF"), "{text}");
            assert!(text.contains("50.50 CHF"), "{text}");
        }
    }

    #[test]
    fn test_date_label() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(date_label(date, Language::Fr), "samedi 17 octobre");
        assert_eq!(date_label(date, Language::De), "Samstag, 17. Oktober");
        assert_eq!(date_label(date, Language::En), "Saturday, 17 October");
    }

    #[test]
    fn test_delivery_type_label() {
        assert_eq!(
            delivery_type_label(DeliveryType::RailwayStation, Language::Fr),
            "Livraison en gare"
        );
    }
}
