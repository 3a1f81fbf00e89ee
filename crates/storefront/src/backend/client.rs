//! Backend HTTP client.
//!
//! Station and pickup-location directories are cached with `moka`
//! (10-minute TTL). City lookups are cached one level up, by the
//! [`CityResolver`](crate::resolver::CityResolver). Orders are never cached
//! nor retried.

use std::sync::Arc;
use std::time::Duration;

use lemanshop_core::{Language, PostalCode};
use lemanshop_delivery::CityLookupResult;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::BackendError;
use super::types::{DataEnvelope, OrderConfirmation, OrderPayload, PickupLocation, RailwayStation};

const DIRECTORY_TTL: Duration = Duration::from_secs(600);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cached directory listings.
#[derive(Debug, Clone)]
enum CacheValue {
    Stations(Arc<Vec<RailwayStation>>),
    PickupLocations(Arc<Vec<PickupLocation>>),
}

/// Client for the order and delivery-zone backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(DIRECTORY_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: directory_url(base_url),
                cache,
            }),
        })
    }

    /// Resolve a postal code to a city in the delivery corridor.
    ///
    /// Returns `Ok(None)` when the backend answers 404 (not served).
    ///
    /// # Errors
    ///
    /// Returns error on network failures, unexpected statuses, or malformed
    /// bodies.
    #[instrument(skip(self), fields(postal_code = %postal_code))]
    pub async fn city(&self, postal_code: PostalCode) -> Result<Option<CityLookupResult>, BackendError> {
        let url = self.endpoint(&format!("api/delivery/cities/{postal_code}"))?;
        let response = self.inner.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("Postal code outside the delivery corridor");
            return Ok(None);
        }

        read_json(response).await.map(Some)
    }

    /// Railway stations served by station delivery, labelled in `language`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend request fails.
    #[instrument(skip(self), fields(lang = language.code()))]
    pub async fn railway_stations(
        &self,
        language: Language,
    ) -> Result<Arc<Vec<RailwayStation>>, BackendError> {
        let cache_key = format!("stations:{}", language.code());

        if let Some(CacheValue::Stations(stations)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for railway stations");
            return Ok(stations);
        }

        let mut url = self.endpoint("api/railway-stations")?;
        url.query_pairs_mut().append_pair("lang", language.code());
        let response = self.inner.client.get(url).send().await?;
        let envelope: DataEnvelope<RailwayStation> = read_json(response).await?;

        let stations = Arc::new(envelope.data);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Stations(Arc::clone(&stations)))
            .await;
        Ok(stations)
    }

    /// Stores where orders can be picked up.
    ///
    /// # Errors
    ///
    /// Returns error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn pickup_locations(&self) -> Result<Arc<Vec<PickupLocation>>, BackendError> {
        let cache_key = "pickup-locations".to_string();

        if let Some(CacheValue::PickupLocations(locations)) =
            self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for pickup locations");
            return Ok(locations);
        }

        let url = self.endpoint("api/delivery/pickup-locations")?;
        let response = self.inner.client.get(url).send().await?;
        let locations: Vec<PickupLocation> = read_json(response).await?;

        let locations = Arc::new(locations);
        self.inner
            .cache
            .insert(cache_key, CacheValue::PickupLocations(Arc::clone(&locations)))
            .await;
        Ok(locations)
    }

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the order or cannot be reached.
    #[instrument(skip(self, order), fields(delivery_type = %order.delivery_type))]
    pub async fn submit_order(&self, order: &OrderPayload) -> Result<OrderConfirmation, BackendError> {
        let url = self.endpoint("api/orders")?;
        let response = self.inner.client.post(url).json(order).send().await?;
        read_json(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }
}

/// Ensure the base URL ends with `/` so relative joins keep its path.
pub(crate) fn directory_url(base_url: &Url) -> Url {
    let mut url = base_url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Check the status and decode a JSON body.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_url_appends_slash() {
        let base = Url::parse("https://backend.example.ch/shop").unwrap();
        let url = directory_url(&base).join("api/orders").unwrap();
        assert_eq!(url.as_str(), "https://backend.example.ch/shop/api/orders");

        let base = Url::parse("http://localhost:4000").unwrap();
        let url = directory_url(&base).join("api/orders").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/api/orders");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transient() {
        // Port 9 (discard) is closed on test hosts.
        let client = BackendClient::new(&Url::parse("http://127.0.0.1:9").unwrap()).unwrap();
        let err = client
            .city(PostalCode::parse("1260").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
