//! Translation constants for transactional emails.
//!
//! The backend sends the order confirmation; it fetches these tables from
//! `GET /api/i18n/emails/{lang}` so wording stays in one place. Weekday,
//! month and delivery-type names come from the delivery rules so that
//! emails and the checkout page agree.

use chrono::NaiveDate;
use lemanshop_core::{DeliveryType, Language};
use lemanshop_delivery::messages;
use serde::Serialize;

/// Delivery-type names.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTypeLabels {
    pub pickup: &'static str,
    pub address: &'static str,
    pub railway_station: &'static str,
}

impl DeliveryTypeLabels {
    const fn for_language(language: Language) -> Self {
        Self {
            pickup: messages::delivery_type_label(DeliveryType::Pickup, language),
            address: messages::delivery_type_label(DeliveryType::Address, language),
            railway_station: messages::delivery_type_label(DeliveryType::RailwayStation, language),
        }
    }
}

/// Texts of the order confirmation email in one language.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTranslations {
    pub language: Language,
    pub order_confirmation_subject: &'static str,
    pub order_confirmation_heading: &'static str,
    /// Contains a `{name}` placeholder.
    pub greeting: &'static str,
    pub greeting_anonymous: &'static str,
    pub intro: &'static str,
    pub delivery_heading: &'static str,
    pub delivery_date_label: &'static str,
    pub payment_heading: &'static str,
    pub total_label: &'static str,
    pub delivery_cost_free: &'static str,
    pub closing: &'static str,
    pub signature: &'static str,
    pub delivery_types: DeliveryTypeLabels,
    /// Sunday first.
    pub weekdays: [&'static str; 7],
    pub months: [&'static str; 12],
}

static FR: EmailTranslations = EmailTranslations {
    language: Language::Fr,
    order_confirmation_subject: "Confirmation de votre commande",
    order_confirmation_heading: "Merci pour votre commande !",
    greeting: "Bonjour {name},",
    greeting_anonymous: "Bonjour,",
    intro: "Nous avons bien reçu votre commande et la préparons avec soin.",
    delivery_heading: "Livraison",
    delivery_date_label: "Date de livraison",
    payment_heading: "Paiement",
    total_label: "Total",
    delivery_cost_free: "Gratuite",
    closing: "Pour toute question, répondez simplement à cet e-mail.",
    signature: "L'équipe Léman Shop",
    delivery_types: DeliveryTypeLabels::for_language(Language::Fr),
    weekdays: messages::weekday_names(Language::Fr),
    months: messages::month_names(Language::Fr),
};

static DE: EmailTranslations = EmailTranslations {
    language: Language::De,
    order_confirmation_subject: "Bestätigung Ihrer Bestellung",
    order_confirmation_heading: "Vielen Dank für Ihre Bestellung!",
    greeting: "Guten Tag {name},",
    greeting_anonymous: "Guten Tag,",
    intro: "Wir haben Ihre Bestellung erhalten und bereiten sie sorgfältig vor.",
    delivery_heading: "Lieferung",
    delivery_date_label: "Lieferdatum",
    payment_heading: "Zahlung",
    total_label: "Total",
    delivery_cost_free: "Kostenlos",
    closing: "Bei Fragen antworten Sie einfach auf diese E-Mail.",
    signature: "Ihr Léman Shop Team",
    delivery_types: DeliveryTypeLabels::for_language(Language::De),
    weekdays: messages::weekday_names(Language::De),
    months: messages::month_names(Language::De),
};

static EN: EmailTranslations = EmailTranslations {
    language: Language::En,
    order_confirmation_subject: "Your order confirmation",
    order_confirmation_heading: "Thank you for your order!",
    greeting: "Hello {name},",
    greeting_anonymous: "Hello,",
    intro: "We have received your order and are preparing it with care.",
    delivery_heading: "Delivery",
    delivery_date_label: "Delivery date",
    payment_heading: "Payment",
    total_label: "Total",
    delivery_cost_free: "Free",
    closing: "If you have any questions, simply reply to this email.",
    signature: "The Léman Shop team",
    delivery_types: DeliveryTypeLabels::for_language(Language::En),
    weekdays: messages::weekday_names(Language::En),
    months: messages::month_names(Language::En),
};

/// Email texts for `language`.
#[must_use]
pub const fn email_translations(language: Language) -> &'static EmailTranslations {
    match language {
        Language::Fr => &FR,
        Language::De => &DE,
        Language::En => &EN,
    }
}

/// Salutation line, e.g. `Bonjour Anna,`.
#[must_use]
pub fn greeting(language: Language, name: Option<&str>) -> String {
    let texts = email_translations(language);
    match name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => texts.greeting.replace("{name}", name),
        None => texts.greeting_anonymous.to_owned(),
    }
}

/// One-line delivery summary, e.g. `Livraison en gare, lundi 19 octobre`.
#[must_use]
pub fn delivery_summary(language: Language, delivery_type: DeliveryType, date: NaiveDate) -> String {
    format!(
        "{}, {}",
        messages::delivery_type_label(delivery_type, language),
        messages::date_label(date, language)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_match_language() {
        for language in [Language::Fr, Language::De, Language::En] {
            assert_eq!(email_translations(language).language, language);
        }
        assert_eq!(email_translations(Language::De).weekdays[0], "Sonntag");
    }

    #[test]
    fn test_greeting() {
        assert_eq!(greeting(Language::Fr, Some(" Anna ")), "Bonjour Anna,");
        assert_eq!(greeting(Language::De, Some("")), "Guten Tag,");
        assert_eq!(greeting(Language::En, None), "Hello,");
    }

    #[test]
    fn test_delivery_summary() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            delivery_summary(Language::Fr, DeliveryType::RailwayStation, monday),
            "Livraison en gare, lundi 19 octobre"
        );
        assert_eq!(
            delivery_summary(Language::En, DeliveryType::Pickup, monday),
            "Pickup, Monday, 19 October"
        );
    }

    #[test]
    fn test_serialises_camel_case() {
        let json = serde_json::to_value(email_translations(Language::En)).unwrap();
        assert_eq!(json["language"], "en");
        assert_eq!(json["deliveryTypes"]["railwayStation"], "Railway station delivery");
        assert_eq!(json["months"][9], "October");
    }
}
