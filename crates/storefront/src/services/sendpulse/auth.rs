//! `SendPulse` OAuth client-credentials authentication.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use super::SendPulseError;
use super::types::TokenResponse;

/// Tokens are refreshed this many seconds before they expire.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

/// Bearer token obtained from `SendPulse`.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Bearer token for API requests.
    pub value: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

impl AccessToken {
    #[must_use]
    pub fn new(value: impl Into<String>, expires_in: i64, now: i64) -> Self {
        Self {
            value: SecretString::from(value.into()),
            expires_at: now + expires_in,
        }
    }

    /// Check if the token should be replaced at `now`.
    #[must_use]
    pub const fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at - TOKEN_REFRESH_MARGIN_SECS
    }

    /// Check if the token should be replaced.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

/// Request a token with the client-credentials grant.
///
/// # Errors
///
/// Returns `SendPulseError::AuthenticationFailed` if the credentials are rejected.
#[instrument(skip(client, client_secret), fields(client_id = %client_id))]
pub async fn request_token(
    client: &reqwest::Client,
    token_url: Url,
    client_id: &str,
    client_secret: &SecretString,
) -> Result<AccessToken, SendPulseError> {
    let now = chrono::Utc::now().timestamp();

    let response = client
        .post(token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
        ])
        .send()
        .await?;

    let status = response.status();

    if status.is_success() {
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SendPulseError::Parse(e.to_string()))?;
        Ok(AccessToken::new(token.access_token, token.expires_in, now))
    } else {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(SendPulseError::AuthenticationFailed(format!(
            "HTTP {status}: {}",
            error_text.chars().take(200).collect::<String>()
        )))
    }
}
