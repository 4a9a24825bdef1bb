//! Payer Geography
//!
//! Best-effort, fire-and-forget country detection. Raw answers are
//! session-cached and pass a strict two-letter gate before anything
//! trusts them; a failed or pending lookup simply leaves the country
//! unknown and the router treats that as domestic.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use checkout_attribution::SessionCache;
use checkout_core::CountryCode;

/// Geo lookup errors; never propagated past the cache wrapper
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("geo lookup failed: {0}")]
    Lookup(String),
}

/// Raw country detection source
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// The raw detected value, untrusted until gated
    async fn detect_country(&self) -> std::result::Result<String, GeoError>;
}

const COUNTRY_KEY: &str = "payer_country";

/// Session-cached, gate-validating wrapper around any `GeoLocator`
pub struct CachedGeoLocator {
    locator: Arc<dyn GeoLocator>,
    cache: SessionCache<String, String>,
}

impl CachedGeoLocator {
    pub fn new(locator: Arc<dyn GeoLocator>) -> Self {
        Self {
            locator,
            cache: SessionCache::with_capacity(4),
        }
    }

    /// Cached country, re-gated before being trusted
    pub fn cached(&self) -> Option<CountryCode> {
        self.cache
            .get(&COUNTRY_KEY.to_string())
            .and_then(|raw| CountryCode::parse(&raw).ok())
    }

    /// Best-effort refresh. Errors and junk answers are logged and
    /// dropped; callers never gate checkout on this resolving.
    pub async fn refresh(&self) -> Option<CountryCode> {
        if let Some(country) = self.cached() {
            return Some(country);
        }
        let raw = match self.locator.detect_country().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(error = %e, "country detection failed");
                return None;
            }
        };
        match CountryCode::parse(&raw) {
            Ok(country) => {
                self.cache
                    .insert(COUNTRY_KEY.to_string(), country.as_str().to_string());
                Some(country)
            }
            Err(_) => {
                tracing::debug!(raw = %raw, "country detection returned junk");
                None
            }
        }
    }
}

/// IP-geolocation endpoint answering with a bare two-letter code
pub struct HttpGeoLocator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGeoLocator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_env() -> Self {
        let endpoint = std::env::var("GEO_ENDPOINT")
            .unwrap_or_else(|_| "https://ipapi.co/country/".into());
        Self::new(endpoint)
    }
}

#[async_trait]
impl GeoLocator for HttpGeoLocator {
    async fn detect_country(&self) -> std::result::Result<String, GeoError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| GeoError::Lookup(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeoError::Lookup(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| GeoError::Lookup(e.to_string()))?;

        Ok(body.trim().to_string())
    }
}
