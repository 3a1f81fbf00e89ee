//! Application state shared across handlers.

use std::sync::Arc;

use chrono::NaiveDate;
use lemanshop_delivery::DeliveryRules;
use tracing::debug;

use crate::backend::{BackendClient, BackendError};
use crate::config::StorefrontConfig;
use crate::resolver::CityResolver;
use crate::services::crm_queue::{CrmQueueStats, CrmSyncQueue};
use crate::services::sendpulse::{CrmContact, SendPulseClient, SendPulseError};

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("SendPulse client: {0}")]
    SendPulse(#[from] SendPulseError),
}

/// Source of "today" for delivery scheduling.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    /// The current date in Switzerland.
    Zurich,
    /// A fixed date.
    Fixed(NaiveDate),
}

impl Clock {
    #[must_use]
    pub fn today(self) -> NaiveDate {
        match self {
            Self::Zurich => chrono::Utc::now()
                .with_timezone(&chrono_tz::Europe::Zurich)
                .date_naive(),
            Self::Fixed(date) => date,
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    rules: DeliveryRules,
    clock: Clock,
    resolver: CityResolver,
    backend: Option<BackendClient>,
    crm: Option<CrmSyncQueue>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Spawns the CRM sync worker when `SendPulse` is configured, so this must
    /// be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, clock: Clock) -> Result<Self, StateError> {
        let backend = config
            .delivery
            .backend_url
            .as_ref()
            .map(BackendClient::new)
            .transpose()?;

        let crm = match &config.sendpulse {
            Some(sendpulse) => {
                let client = SendPulseClient::new(sendpulse)?;
                Some(CrmSyncQueue::spawn(config.crm_queue_capacity, client))
            }
            None => None,
        };

        let resolver = CityResolver::from_config(&config.delivery, backend.clone());
        let rules = config.delivery.rules();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                rules,
                clock,
                resolver,
                backend,
                crm,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Delivery rules derived from configuration.
    #[must_use]
    pub fn rules(&self) -> &DeliveryRules {
        &self.inner.rules
    }

    /// Today's date for scheduling.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.inner.clock.today()
    }

    #[must_use]
    pub fn resolver(&self) -> &CityResolver {
        &self.inner.resolver
    }

    /// The backend client, if a backend URL is configured.
    #[must_use]
    pub fn backend(&self) -> Option<&BackendClient> {
        self.inner.backend.as_ref()
    }

    /// CRM queue counters, if CRM sync is configured.
    #[must_use]
    pub fn crm_stats(&self) -> Option<CrmQueueStats> {
        self.inner.crm.as_ref().map(CrmSyncQueue::stats)
    }

    /// Queue a contact for CRM sync. Never blocks.
    ///
    /// Returns whether the contact was queued.
    pub fn enqueue_contact(&self, contact: CrmContact) -> bool {
        match &self.inner.crm {
            Some(queue) => queue.enqueue(contact),
            None => {
                debug!(contact_email = %contact.email, "CRM not configured, skipping sync");
                false
            }
        }
    }
}
