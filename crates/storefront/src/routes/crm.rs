//! CRM hook for registrations and newsletter sign-ups.

use axum::{Json, extract::State, http::StatusCode};
use lemanshop_core::{Email, Language, Phone};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, FieldErrors, Result};
use crate::services::sendpulse::{ContactSource, CrmContact};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub lang: Option<String>,
    pub source: Option<ContactSource>,
}

#[derive(Debug, Serialize)]
pub struct ContactAccepted {
    /// Whether the contact was handed to the sync worker.
    pub queued: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl ContactRequest {
    fn into_contact(self) -> std::result::Result<CrmContact, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = match non_blank(self.email) {
            Some(raw) => Email::parse(&raw)
                .map_err(|e| errors.add("email", e.to_string()))
                .ok(),
            None => {
                errors.add("email", "This field is required");
                None
            }
        };
        let phone = match non_blank(self.phone) {
            Some(raw) => match Phone::parse(&raw) {
                Ok(phone) => Some(phone),
                Err(e) => {
                    errors.add("phone", e.to_string());
                    None
                }
            },
            None => None,
        };

        match email {
            Some(email) if errors.is_empty() => Ok(CrmContact {
                email,
                first_name: non_blank(self.first_name),
                last_name: non_blank(self.last_name),
                phone,
                language: Language::from_tag_or_default(self.lang.as_deref()),
                source: self.source.unwrap_or(ContactSource::Registration),
            }),
            _ => Err(errors),
        }
    }
}

/// Queue a contact for CRM sync.
///
/// Answers 202 as soon as the contact is validated. Sync happens in the
/// background; when CRM is not configured the contact is skipped.
#[instrument(skip(state, request), fields(source = ?request.source))]
pub async fn create_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactAccepted>)> {
    let contact = request.into_contact().map_err(AppError::Validation)?;
    let queued = state.enqueue_contact(contact);
    Ok((StatusCode::ACCEPTED, Json(ContactAccepted { queued })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_defaults() {
        let contact = ContactRequest {
            email: Some(" Lea@Example.ch ".to_string()),
            first_name: Some("  ".to_string()),
            lang: Some("de-CH".to_string()),
            ..ContactRequest::default()
        }
        .into_contact()
        .unwrap();

        assert_eq!(contact.email.as_str(), "lea@example.ch");
        assert_eq!(contact.first_name, None);
        assert_eq!(contact.language, Language::De);
        assert_eq!(contact.source, ContactSource::Registration);
    }

    #[test]
    fn test_contact_errors() {
        let errors = ContactRequest {
            phone: Some("abc".to_string()),
            ..ContactRequest::default()
        }
        .into_contact()
        .unwrap_err();

        assert_eq!(errors.get("email"), Some("This field is required"));
        assert!(errors.get("phone").is_some());
    }
}
