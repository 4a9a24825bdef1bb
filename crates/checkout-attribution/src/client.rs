//! Attribution Client
//!
//! Wraps a `PageViewApi` with the guarantees the checkout path relies on:
//! the view record is issued at most once per mount per session, milestone
//! patches are idempotent from the caller's perspective, and no failure
//! ever propagates out. Attribution is observability, never a dependency
//! of correctness.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use checkout_core::CreatorId;

use crate::error::Result;
use crate::funnel::{FunnelMilestone, FunnelState, ReferrerMeta, ViewId};

/// External page-view analytics service
#[async_trait]
pub trait PageViewApi: Send + Sync {
    /// Record a page view and return its opaque id
    async fn record_view(&self, profile: &CreatorId, referrer: &ReferrerMeta) -> Result<ViewId>;

    /// Patch one funnel milestone onto an existing view
    async fn patch_view(&self, view: &ViewId, milestone: FunnelMilestone) -> Result<()>;
}

#[derive(Debug, Default)]
struct AttributionState {
    /// At-most-once guard for the mount-time record call. Survives
    /// re-renders because the client itself lives outside the render cycle.
    record_attempted: bool,

    view: Option<ViewId>,

    /// Milestones already delivered upstream
    funnel: FunnelState,
}

/// Session-scoped attribution handle.
///
/// Hold one per buyer visit, outside any re-created render state.
pub struct AttributionClient {
    api: Option<Arc<dyn PageViewApi>>,
    state: Mutex<AttributionState>,
}

impl AttributionClient {
    pub fn new(api: Arc<dyn PageViewApi>) -> Self {
        Self {
            api: Some(api),
            state: Mutex::new(AttributionState::default()),
        }
    }

    /// A client that records nothing, for the owner previewing their own page
    pub fn preview() -> Self {
        Self {
            api: None,
            state: Mutex::new(AttributionState::default()),
        }
    }

    /// The view id, if one was obtained
    pub fn view_id(&self) -> Option<ViewId> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner).view.clone()
    }

    /// Milestones delivered so far
    pub fn funnel(&self) -> FunnelState {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner).funnel
    }

    /// Mount-time view record: at most one upstream call per session, no
    /// matter how many times the purchase screen mounts.
    pub async fn record_view_once(
        &self,
        profile: &CreatorId,
        referrer: &ReferrerMeta,
    ) -> Option<ViewId> {
        let Some(api) = self.api.clone() else {
            return None;
        };
        {
            let mut state = self.lock();
            if state.record_attempted {
                return state.view.clone();
            }
            state.record_attempted = true;
        }
        self.record(api.as_ref(), profile, referrer).await
    }

    /// Best-effort fallback used immediately before starting checkout when
    /// no view id exists yet (owner preview aside). May re-issue the record
    /// call if the mount-time attempt failed or never resolved.
    pub async fn ensure_view(
        &self,
        profile: &CreatorId,
        referrer: &ReferrerMeta,
    ) -> Option<ViewId> {
        let Some(api) = self.api.clone() else {
            return None;
        };
        if let Some(view) = self.view_id() {
            return Some(view);
        }
        {
            self.lock().record_attempted = true;
        }
        self.record(api.as_ref(), profile, referrer).await
    }

    /// Fire-and-forget milestone patch. A milestone goes upstream at most
    /// once; repeats and failures are both silent to the caller.
    pub async fn milestone(&self, milestone: FunnelMilestone) {
        let Some(api) = self.api.clone() else {
            return;
        };
        let view = {
            let state = self.lock();
            if state.funnel.contains(milestone) {
                return;
            }
            match state.view.clone() {
                Some(view) => view,
                None => {
                    tracing::debug!(%milestone, "skipping funnel patch, no view id");
                    return;
                }
            }
        };

        match api.patch_view(&view, milestone).await {
            Ok(()) => self.lock().funnel.apply(milestone),
            Err(e) => tracing::warn!(%milestone, error = %e, "funnel patch failed"),
        }
    }

    async fn record(
        &self,
        api: &dyn PageViewApi,
        profile: &CreatorId,
        referrer: &ReferrerMeta,
    ) -> Option<ViewId> {
        match api.record_view(profile, referrer).await {
            Ok(view) => {
                let mut state = self.lock();
                // keep the first id if a concurrent attempt won
                if state.view.is_none() {
                    state.view = Some(view);
                }
                state.view.clone()
            }
            Err(e) => {
                tracing::warn!(profile = %profile, error = %e, "view record failed");
                None
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AttributionState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttributionError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingApi {
        record_calls: AtomicUsize,
        patch_calls: AtomicUsize,
        fail_record: bool,
    }

    #[async_trait]
    impl PageViewApi for CountingApi {
        async fn record_view(
            &self,
            _profile: &CreatorId,
            _referrer: &ReferrerMeta,
        ) -> Result<ViewId> {
            self.record_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_record {
                return Err(AttributionError::Http("boom".into()));
            }
            Ok(ViewId::from_string("view-1"))
        }

        async fn patch_view(&self, _view: &ViewId, _milestone: FunnelMilestone) -> Result<()> {
            self.patch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn profile() -> CreatorId {
        CreatorId::new("creator-1")
    }

    #[tokio::test]
    async fn test_double_mount_records_exactly_once() {
        let api = Arc::new(CountingApi::default());
        let client = AttributionClient::new(api.clone());

        // Framework double-invoke on mount
        let first = client.record_view_once(&profile(), &ReferrerMeta::default()).await;
        let second = client.record_view_once(&profile(), &ReferrerMeta::default()).await;

        assert_eq!(api.record_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert!(client.view_id().is_some());
    }

    #[tokio::test]
    async fn test_ensure_view_retries_after_failed_mount_record() {
        let api = Arc::new(CountingApi {
            fail_record: true,
            ..CountingApi::default()
        });
        let client = AttributionClient::new(api.clone());

        assert!(client.record_view_once(&profile(), &ReferrerMeta::default()).await.is_none());
        // The pre-checkout fallback gets one more best-effort attempt
        assert!(client.ensure_view(&profile(), &ReferrerMeta::default()).await.is_none());
        assert_eq!(api.record_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_milestone_patch_is_idempotent() {
        let api = Arc::new(CountingApi::default());
        let client = AttributionClient::new(api.clone());
        client.record_view_once(&profile(), &ReferrerMeta::default()).await;

        client.milestone(FunnelMilestone::ReachedPayment).await;
        let after_first = client.funnel();

        client.milestone(FunnelMilestone::StartedCheckout).await;
        client.milestone(FunnelMilestone::StartedCheckout).await;

        // Second started_checkout patch neither re-sends nor disturbs
        // the earlier milestone
        assert_eq!(api.patch_calls.load(Ordering::SeqCst), 2);
        assert!(client.funnel().started_checkout);
        assert_eq!(client.funnel().reached_payment, after_first.reached_payment);
    }

    #[tokio::test]
    async fn test_milestone_without_view_is_silent() {
        let api = Arc::new(CountingApi::default());
        let client = AttributionClient::new(api.clone());

        client.milestone(FunnelMilestone::StartedCheckout).await;
        assert_eq!(api.patch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_preview_client_never_calls_upstream() {
        let client = AttributionClient::preview();
        assert!(client.record_view_once(&profile(), &ReferrerMeta::default()).await.is_none());
        client.milestone(FunnelMilestone::ReachedPayment).await;
        assert!(client.view_id().is_none());
    }
}
