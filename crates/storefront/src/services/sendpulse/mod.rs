//! `SendPulse` CRM client.
//!
//! Mirrors customers into `SendPulse`. A sync first tries the CRM contacts API
//! (create, then attach email, phone and attributes). If the contact cannot
//! be created, the customer is added to a mailing list instead so the address
//! is not lost.
//!
//! CRM sync is best-effort: nothing here is retried and callers only log
//! failures. See [`crate::services::crm_queue`].

pub mod auth;
pub mod types;

use std::sync::Arc;

use lemanshop_core::{ContactId, Email, Phone};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::backend::directory_url;
use crate::config::SendPulseConfig;

use auth::{AccessToken, request_token};
pub use types::{AddressBook, ContactSource, CrmContact};
use types::{
    AddEmailsRequest, AddressBookEmail, ContactAttribute, ContactAttributesRequest,
    ContactEmailRequest, ContactPhoneRequest, CreateContactRequest, CreatedContactEnvelope,
};

/// Errors that can occur when interacting with the `SendPulse` API.
#[derive(Debug, Error)]
pub enum SendPulseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client credentials were rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// No address book is configured and the account has none.
    #[error("No address book available for fallback sync")]
    NoAddressBook,
}

/// How a contact ended up in `SendPulse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Created as a CRM contact.
    Contact(ContactId),
    /// Added to a mailing list after contact creation failed.
    AddressBook(i64),
}

/// `SendPulse` API client.
///
/// # Authentication
///
/// Uses OAuth client credentials. The bearer token is cached in memory and
/// replaced five minutes before it expires.
#[derive(Clone)]
pub struct SendPulseClient {
    inner: Arc<SendPulseClientInner>,
}

struct SendPulseClientInner {
    client: reqwest::Client,
    api_url: Url,
    client_id: String,
    client_secret: SecretString,
    addressbook_id: Option<i64>,
    /// In-memory token cache
    token: RwLock<Option<AccessToken>>,
}

impl SendPulseClient {
    /// Create a new `SendPulse` client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &SendPulseConfig) -> Result<Self, SendPulseError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            inner: Arc::new(SendPulseClientInner {
                client,
                api_url: directory_url(&config.api_url),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                addressbook_id: config.addressbook_id,
                token: RwLock::new(None),
            }),
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Get a valid bearer token, requesting a new one if needed.
    ///
    /// # Errors
    ///
    /// Returns `SendPulseError::AuthenticationFailed` if the credentials are rejected.
    pub async fn access_token(&self) -> Result<SecretString, SendPulseError> {
        if let Some(token) = self.inner.token.read().await.as_ref()
            && !token.is_expired()
        {
            return Ok(token.value.clone());
        }

        let mut cached = self.inner.token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref()
            && !token.is_expired()
        {
            return Ok(token.value.clone());
        }

        debug!("Requesting SendPulse access token");
        let token = request_token(
            &self.inner.client,
            self.endpoint("oauth/access_token")?,
            &self.inner.client_id,
            &self.inner.client_secret,
        )
        .await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Clear the cached token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    // =========================================================================
    // CRM contacts
    // =========================================================================

    /// Create a CRM contact and return its id.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, contact), fields(contact_email = %contact.email))]
    pub async fn create_contact(&self, contact: &CrmContact) -> Result<ContactId, SendPulseError> {
        let body = CreateContactRequest {
            first_name: contact.first_name.as_deref().unwrap_or_default(),
            last_name: contact.last_name.as_deref().unwrap_or_default(),
            external_contact_id: contact.email.as_str(),
        };
        let created: CreatedContactEnvelope = self.post("crm/v1/contacts/create", &body).await?;
        Ok(ContactId::new(created.data.id.to_string()))
    }

    /// Attach an email address to a contact.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, email), fields(contact_id = %id))]
    pub async fn add_contact_email(&self, id: &ContactId, email: &Email) -> Result<(), SendPulseError> {
        let body = ContactEmailRequest {
            email: email.as_str(),
            is_main: true,
        };
        self.post_ignoring_body(&format!("crm/v1/contacts/{id}/emails"), &body)
            .await
    }

    /// Attach a phone number to a contact.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, phone), fields(contact_id = %id))]
    pub async fn add_contact_phone(&self, id: &ContactId, phone: &Phone) -> Result<(), SendPulseError> {
        let body = ContactPhoneRequest {
            phone: phone.as_str(),
            is_main: true,
        };
        self.post_ignoring_body(&format!("crm/v1/contacts/{id}/phones"), &body)
            .await
    }

    /// Record language and source on a contact.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, contact), fields(contact_id = %id))]
    pub async fn set_contact_attributes(
        &self,
        id: &ContactId,
        contact: &CrmContact,
    ) -> Result<(), SendPulseError> {
        let body = ContactAttributesRequest {
            attributes: vec![
                ContactAttribute {
                    name: "language",
                    value: contact.language.code(),
                },
                ContactAttribute {
                    name: "source",
                    value: contact.source.as_str(),
                },
            ],
        };
        self.post_ignoring_body(&format!("crm/v1/contacts/{id}/attributes"), &body)
            .await
    }

    // =========================================================================
    // Address books
    // =========================================================================

    /// List the account's address books.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn address_books(&self) -> Result<Vec<AddressBook>, SendPulseError> {
        self.get("addressbooks").await
    }

    /// Add a contact to an address book.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, contact), fields(contact_email = %contact.email))]
    pub async fn add_to_address_book(
        &self,
        book_id: i64,
        contact: &CrmContact,
    ) -> Result<(), SendPulseError> {
        let body = AddEmailsRequest {
            emails: vec![AddressBookEmail::from_contact(contact)],
        };
        self.post_ignoring_body(&format!("addressbooks/{book_id}/emails"), &body)
            .await
    }

    // =========================================================================
    // Sync
    // =========================================================================

    /// Mirror a customer into `SendPulse`.
    ///
    /// Once the contact exists, email, phone and attributes are attached
    /// independently; a failure in one is logged and does not stop the others.
    /// If the contact cannot be created, falls back to the configured (or
    /// first) address book.
    ///
    /// # Errors
    ///
    /// Returns error only if both the contact and the fallback fail.
    #[instrument(skip(self, contact), fields(contact_email = %contact.email, source = contact.source.as_str()))]
    pub async fn sync_contact(&self, contact: &CrmContact) -> Result<SyncOutcome, SendPulseError> {
        let id = match self.create_contact(contact).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "CRM contact creation failed, falling back to address book");
                let book_id = self.fallback_address_book().await?;
                self.add_to_address_book(book_id, contact).await?;
                info!(book_id, "Contact added to address book");
                return Ok(SyncOutcome::AddressBook(book_id));
            }
        };

        if let Err(e) = self.add_contact_email(&id, &contact.email).await {
            warn!(error = %e, contact_id = %id, "Failed to attach email to CRM contact");
        }
        if let Some(phone) = &contact.phone
            && let Err(e) = self.add_contact_phone(&id, phone).await
        {
            warn!(error = %e, contact_id = %id, "Failed to attach phone to CRM contact");
        }
        if let Err(e) = self.set_contact_attributes(&id, contact).await {
            warn!(error = %e, contact_id = %id, "Failed to set CRM contact attributes");
        }

        info!(contact_id = %id, "CRM contact synced");
        Ok(SyncOutcome::Contact(id))
    }

    async fn fallback_address_book(&self) -> Result<i64, SendPulseError> {
        if let Some(id) = self.inner.addressbook_id {
            return Ok(id);
        }
        self.address_books()
            .await?
            .first()
            .map(|book| book.id)
            .ok_or(SendPulseError::NoAddressBook)
    }

    // =========================================================================
    // HTTP helpers
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, SendPulseError> {
        Ok(self.inner.api_url.join(path)?)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, SendPulseError> {
        let token = self.access_token().await?;
        let request = self
            .inner
            .client
            .get(self.endpoint(path)?)
            .bearer_auth(token.expose_secret());
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| SendPulseError::Parse(e.to_string()))
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, SendPulseError> {
        let body = self.send_post(path, body).await?;
        serde_json::from_str(&body).map_err(|e| SendPulseError::Parse(e.to_string()))
    }

    async fn post_ignoring_body<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), SendPulseError> {
        self.send_post(path, body).await.map(drop)
    }

    async fn send_post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String, SendPulseError> {
        let token = self.access_token().await?;
        let request = self
            .inner
            .client
            .post(self.endpoint(path)?)
            .bearer_auth(token.expose_secret())
            .json(body);
        self.execute(request).await
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, SendPulseError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Revoked or rotated: the next call authenticates again.
            self.clear_token().await;
        }

        if !status.is_success() {
            return Err(SendPulseError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }
}
