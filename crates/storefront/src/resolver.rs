//! Postal code to city resolution.
//!
//! Wraps the delivery-zone lookup with the policy the checkout relies on:
//!
//! - a 404 from the backend is a definitive *not served* answer;
//! - network errors, 5xx and malformed bodies are retried a bounded number of
//!   times with a linear backoff, then reported as *unavailable*;
//! - definitive answers are cached for 10 minutes, *unavailable* never is.
//!
//! Eligibility treats *not served* and *unavailable* alike (the conservative
//! 200 CHF minimum), so a flaky lookup can only make checkout stricter.

use std::time::Duration;

use lemanshop_core::{PostalCode, PostalCodeInput};
use lemanshop_delivery::{LookupOutcome, corridor_city};
use moka::future::Cache;
use tracing::{debug, instrument, warn};

use crate::backend::BackendClient;
use crate::config::DeliveryConfig;

const CACHE_TTL: Duration = Duration::from_secs(600);
const CACHE_CAPACITY: u64 = 2_000;

/// Where city lookups are answered from.
#[derive(Clone)]
pub enum CitySource {
    /// The delivery-zone service.
    Remote(BackendClient),
    /// The built-in Coppet–Lausanne directory.
    Static,
}

/// Resolves postal codes to cities served by home delivery.
#[derive(Clone)]
pub struct CityResolver {
    source: CitySource,
    retries: u32,
    backoff: Duration,
    cache: Cache<PostalCode, LookupOutcome>,
}

impl CityResolver {
    #[must_use]
    pub fn new(source: CitySource, retries: u32, backoff: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            source,
            retries,
            backoff,
            cache,
        }
    }

    /// Resolver for the configured backend, or the static directory.
    #[must_use]
    pub fn from_config(config: &DeliveryConfig, backend: Option<BackendClient>) -> Self {
        let source = backend.map_or(CitySource::Static, CitySource::Remote);
        Self::new(source, config.lookup_retries, config.lookup_backoff)
    }

    /// Resolve raw postal-code input.
    ///
    /// Returns `None` without any lookup while the input is not a complete
    /// 4-digit code.
    pub async fn resolve_input(&self, raw: &str) -> Option<LookupOutcome> {
        match PostalCodeInput::classify(raw).complete() {
            Some(postal_code) => Some(self.resolve(postal_code).await),
            None => None,
        }
    }

    /// Resolve a postal code.
    #[instrument(skip(self), fields(postal_code = %postal_code))]
    pub async fn resolve(&self, postal_code: PostalCode) -> LookupOutcome {
        if let Some(outcome) = self.cache.get(&postal_code).await {
            debug!("Cache hit for postal code");
            return outcome;
        }

        let outcome = self.lookup(postal_code).await;
        if outcome.is_definitive() {
            self.cache.insert(postal_code, outcome.clone()).await;
        }
        outcome
    }

    async fn lookup(&self, postal_code: PostalCode) -> LookupOutcome {
        let backend = match &self.source {
            CitySource::Remote(backend) => backend,
            CitySource::Static => {
                return corridor_city(postal_code)
                    .map_or(LookupOutcome::NotServed, LookupOutcome::Resolved);
            }
        };

        let mut attempt = 0;
        loop {
            match backend.city(postal_code).await {
                Ok(Some(city)) => return LookupOutcome::Resolved(city),
                Ok(None) => return LookupOutcome::NotServed,
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "Postal code lookup failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        attempts = attempt + 1,
                        "Postal code lookup unavailable, applying default minimum"
                    );
                    return LookupOutcome::Unavailable;
                }
            }
        }
    }
}
