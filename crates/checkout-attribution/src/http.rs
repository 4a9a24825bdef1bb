//! HTTP Page-View API
//!
//! `reqwest` implementation of `PageViewApi` against the analytics
//! service's REST surface.

use async_trait::async_trait;
use checkout_core::CreatorId;
use serde::{Deserialize, Serialize};

use crate::client::PageViewApi;
use crate::error::{AttributionError, Result};
use crate::funnel::{FunnelMilestone, ReferrerMeta, ViewId};

/// Analytics service configuration
#[derive(Clone, Debug)]
pub struct AttributionConfig {
    /// Service base URL, no trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".into(),
            timeout_secs: 5,
        }
    }
}

impl AttributionConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("ATTRIBUTION_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:4000".into());
        Self {
            base_url,
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct RecordViewBody<'a> {
    profile_id: &'a str,
    #[serde(flatten)]
    referrer: &'a ReferrerMeta,
}

#[derive(Deserialize)]
struct RecordViewResponse {
    view_id: String,
}

/// REST-backed page-view recorder
pub struct HttpPageViewApi {
    client: reqwest::Client,
    config: AttributionConfig,
}

impl HttpPageViewApi {
    pub fn new(config: AttributionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn from_env() -> Self {
        Self::new(AttributionConfig::from_env())
    }
}

#[async_trait]
impl PageViewApi for HttpPageViewApi {
    async fn record_view(&self, profile: &CreatorId, referrer: &ReferrerMeta) -> Result<ViewId> {
        let url = format!("{}/views", self.config.base_url);
        let body = RecordViewBody {
            profile_id: profile.as_str(),
            referrer,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AttributionError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| AttributionError::Http(e.to_string()))?;

        let parsed: RecordViewResponse = response
            .json()
            .await
            .map_err(|e| AttributionError::InvalidResponse(e.to_string()))?;

        Ok(ViewId::from_string(parsed.view_id))
    }

    async fn patch_view(&self, view: &ViewId, milestone: FunnelMilestone) -> Result<()> {
        let url = format!("{}/views/{}", self.config.base_url, view);
        let patch = serde_json::json!({ milestone.field_name(): true });

        self.client
            .patch(&url)
            .json(&patch)
            .send()
            .await
            .map_err(|e| AttributionError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| AttributionError::Http(e.to_string()))?;

        Ok(())
    }
}
