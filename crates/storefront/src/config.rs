//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CORS_ORIGIN` - Origin of the SPA allowed to call the API
//! - `DELIVERY_BACKEND_URL` - Base URL of the order/delivery backend. When unset,
//!   postal codes are resolved against the built-in corridor directory and the
//!   proxied endpoints answer 502.
//! - `DELIVERY_LOOKUP_RETRIES` - Retries for transient lookup failures (default: 1)
//! - `DELIVERY_LOOKUP_BACKOFF_MS` - Backoff step between retries (default: 150)
//! - `DELIVERY_MINIMUM_ORDER_CHF` - Minimum order for home delivery (default: 200)
//! - `DELIVERY_WINDOW_DAYS` - Last offered day, counted from today (default: 14, at most 60)
//! - `SENDPULSE_CLIENT_ID` / `SENDPULSE_CLIENT_SECRET` - CRM credentials (both or neither)
//! - `SENDPULSE_API_URL` - `SendPulse` API base (default: <https://api.sendpulse.com>)
//! - `SENDPULSE_ADDRESSBOOK_ID` - Address book used when contact creation fails
//! - `CRM_QUEUE_CAPACITY` - Pending CRM jobs before new ones are dropped (default: 256)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use lemanshop_delivery::DeliveryRules;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Longest scheduling window accepted from the environment.
const MAX_WINDOW_DAYS: u32 = 60;

const DEFAULT_SENDPULSE_API_URL: &str = "https://api.sendpulse.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origin allowed by CORS, if the SPA is served from another host
    pub cors_origin: Option<HeaderValue>,
    /// Delivery backend and rule parameters
    pub delivery: DeliveryConfig,
    /// `SendPulse` CRM credentials; `None` disables CRM sync
    pub sendpulse: Option<SendPulseConfig>,
    /// Bounded capacity of the CRM sync queue
    pub crm_queue_capacity: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

/// Delivery backend and rule parameters.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Base URL of the order/delivery backend
    pub backend_url: Option<Url>,
    /// Retries after a transient postal-code lookup failure
    pub lookup_retries: u32,
    /// Linear backoff step between lookup retries
    pub lookup_backoff: Duration,
    /// Minimum order for home delivery outside the corridor
    pub minimum_order: Decimal,
    /// Last offered delivery day, counted from today
    pub window_days: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        let rules = DeliveryRules::default();
        Self {
            backend_url: None,
            lookup_retries: 1,
            lookup_backoff: Duration::from_millis(150),
            minimum_order: rules.address_minimum_order,
            window_days: rules.window_days,
        }
    }
}

impl DeliveryConfig {
    /// Delivery rules derived from this configuration.
    #[must_use]
    pub fn rules(&self) -> DeliveryRules {
        DeliveryRules {
            address_minimum_order: self.minimum_order,
            window_days: self.window_days,
            ..DeliveryRules::default()
        }
    }
}

/// `SendPulse` API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct SendPulseConfig {
    /// API base URL
    pub api_url: Url,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
    /// Address book used for the fallback sync
    pub addressbook_id: Option<i64>,
}

impl std::fmt::Debug for SendPulseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendPulseConfig")
            .field("api_url", &self.api_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("addressbook_id", &self.addressbook_id)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, if only one of the
    /// `SendPulse` credentials is set, or if the `SendPulse` secret fails
    /// validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("STOREFRONT_PORT", "3000")?;
        let cors_origin = get_optional_env("STOREFRONT_CORS_ORIGIN")
            .map(|origin| {
                HeaderValue::from_str(&origin).map_err(|e| {
                    ConfigError::InvalidEnvVar("STOREFRONT_CORS_ORIGIN".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let delivery = DeliveryConfig::from_env()?;
        let sendpulse = SendPulseConfig::from_env()?;
        let crm_queue_capacity: usize = parse_env_or_default("CRM_QUEUE_CAPACITY", "256")?;
        if crm_queue_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CRM_QUEUE_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            cors_origin,
            delivery,
            sendpulse,
            crm_queue_capacity,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for StorefrontConfig {
    /// Local development settings: no backend, no CRM, no Sentry.
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            cors_origin: None,
            delivery: DeliveryConfig::default(),
            sendpulse: None,
            crm_queue_capacity: 256,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl DeliveryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let backend_url = get_optional_env("DELIVERY_BACKEND_URL")
            .map(|raw| parse_url("DELIVERY_BACKEND_URL", &raw))
            .transpose()?;
        let backoff_ms: u64 = parse_env_or_default("DELIVERY_LOOKUP_BACKOFF_MS", "150")?;
        let minimum_order: Decimal = parse_env_or_default(
            "DELIVERY_MINIMUM_ORDER_CHF",
            &defaults.minimum_order.to_string(),
        )?;
        if minimum_order.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "DELIVERY_MINIMUM_ORDER_CHF".to_string(),
                "must not be negative".to_string(),
            ));
        }

        Ok(Self {
            backend_url,
            lookup_retries: parse_env_or_default("DELIVERY_LOOKUP_RETRIES", "1")?,
            lookup_backoff: Duration::from_millis(backoff_ms),
            minimum_order,
            window_days: validate_window_days(parse_env_or_default(
                "DELIVERY_WINDOW_DAYS",
                &defaults.window_days.to_string(),
            )?)?,
        })
    }
}

/// The scheduling window must reach past the notice period and stay short.
fn validate_window_days(days: u32) -> Result<u32, ConfigError> {
    let notice = DeliveryRules::DEFAULT_NOTICE_DAYS;
    if !(notice..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(ConfigError::InvalidEnvVar(
            "DELIVERY_WINDOW_DAYS".to_string(),
            format!("must be between {notice} and {MAX_WINDOW_DAYS}, got {days}"),
        ));
    }
    Ok(days)
}

impl SendPulseConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_parts(
            get_optional_env("SENDPULSE_CLIENT_ID"),
            get_optional_env("SENDPULSE_CLIENT_SECRET"),
            &get_env_or_default("SENDPULSE_API_URL", DEFAULT_SENDPULSE_API_URL),
            get_optional_env("SENDPULSE_ADDRESSBOOK_ID").as_deref(),
        )
    }

    /// Build the `SendPulse` configuration from raw values.
    ///
    /// Returns `Ok(None)` when neither credential is set.
    fn from_parts(
        client_id: Option<String>,
        client_secret: Option<String>,
        api_url: &str,
        addressbook_id: Option<&str>,
    ) -> Result<Option<Self>, ConfigError> {
        let (client_id, client_secret) = match (client_id, client_secret) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar(
                    "SENDPULSE_CLIENT_SECRET".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("SENDPULSE_CLIENT_ID".to_string()));
            }
            (Some(id), Some(secret)) => (id, secret),
        };

        validate_secret_strength(&client_secret, "SENDPULSE_CLIENT_SECRET")?;

        let addressbook_id = addressbook_id
            .map(|raw| {
                raw.parse::<i64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("SENDPULSE_ADDRESSBOOK_ID".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Some(Self {
            api_url: parse_url("SENDPULSE_API_URL", api_url)?,
            client_id,
            client_secret: SecretString::from(client_secret),
            addressbook_id,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an absolute HTTP(S) URL.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret issued by SendPulse."
            ),
        ));
    }

    Ok(())
}
