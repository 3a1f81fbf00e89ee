//! `SendPulse` request/response types and the contact we sync.

use std::collections::BTreeMap;

use lemanshop_core::{Email, Language, Phone};
use serde::{Deserialize, Serialize};

/// Where a contact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactSource {
    #[default]
    Checkout,
    Registration,
    Newsletter,
}

impl ContactSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Registration => "registration",
            Self::Newsletter => "newsletter",
        }
    }
}

/// A customer to mirror into the CRM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmContact {
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Phone>,
    pub language: Language,
    pub source: ContactSource,
}

impl CrmContact {
    /// `First Last`, or whichever part is known.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Response from `POST /oauth/access_token`.
#[derive(Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateContactRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub external_contact_id: &'a str,
}

#[derive(Deserialize)]
pub(super) struct CreatedContactEnvelope {
    pub data: CreatedContact,
}

#[derive(Deserialize)]
pub(super) struct CreatedContact {
    pub id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ContactEmailRequest<'a> {
    pub email: &'a str,
    pub is_main: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ContactPhoneRequest<'a> {
    pub phone: &'a str,
    pub is_main: bool,
}

#[derive(Serialize)]
pub(super) struct ContactAttributesRequest<'a> {
    pub attributes: Vec<ContactAttribute<'a>>,
}

#[derive(Serialize)]
pub(super) struct ContactAttribute<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// A mailing list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddressBook {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize)]
pub(super) struct AddEmailsRequest {
    pub emails: Vec<AddressBookEmail>,
}

#[derive(Serialize)]
pub(super) struct AddressBookEmail {
    pub email: String,
    pub variables: BTreeMap<&'static str, String>,
}

impl AddressBookEmail {
    pub(super) fn from_contact(contact: &CrmContact) -> Self {
        let mut variables = BTreeMap::new();
        if let Some(name) = contact.display_name() {
            variables.insert("name", name);
        }
        if let Some(phone) = &contact.phone {
            variables.insert("phone", phone.as_str().to_string());
        }
        variables.insert("language", contact.language.code().to_string());
        variables.insert("source", contact.source.as_str().to_string());

        Self {
            email: contact.email.as_str().to_string(),
            variables,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn contact() -> CrmContact {
        CrmContact {
            email: Email::parse("anna@example.ch").unwrap(),
            first_name: Some("Anna".to_string()),
            last_name: Some(" ".to_string()),
            phone: None,
            language: Language::De,
            source: ContactSource::Newsletter,
        }
    }

    #[test]
    fn test_display_name_skips_blank_parts() {
        assert_eq!(contact().display_name().as_deref(), Some("Anna"));
        let anonymous = CrmContact {
            first_name: None,
            last_name: None,
            ..contact()
        };
        assert_eq!(anonymous.display_name(), None);
    }

    #[test]
    fn test_address_book_variables() {
        let json = serde_json::to_value(AddressBookEmail::from_contact(&contact())).unwrap();
        assert_eq!(json["email"], "anna@example.ch");
        assert_eq!(json["variables"]["name"], "Anna");
        assert_eq!(json["variables"]["language"], "de");
        assert_eq!(json["variables"]["source"], "newsletter");
        assert!(json["variables"].get("phone").is_none());
    }
}
