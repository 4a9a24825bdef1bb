//! Checkout Orchestrator
//!
//! Drives one purchase from intent to verified payment:
//!
//! ```text
//! idle ──submit──▶ processing ──▶ redirecting ─ ─ (browser leaves) ─ ─
//!   ▲                   │
//!   │ creation failed   │
//!   └───────────────────┘
//!
//! ─ ─ (browser returns with reference) ─ ─▶ verifying ──▶ success
//!                                               │
//!                                               ▼
//!                                       idle + payment issue
//! ```
//!
//! `redirecting` is a suspend point across a full navigation; local state
//! and real-world payment state can diverge there, which is why re-entry
//! always re-derives truth from `verify_payment` rather than any cached
//! flag. The automatic verification on return is one-shot per reference,
//! keyed on the reference itself so remounts cannot duplicate it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use checkout_attribution::{AttributionClient, FunnelMilestone, ReferrerMeta};
use checkout_core::{quote, select_gateway, CreatorId, Email, PublishedPricing};

use crate::confirm::ConfirmedFlagStore;
use crate::error::{FieldError, FlowError, Result};
use crate::geo::CachedGeoLocator;
use crate::provider::{CheckoutRedirect, CreateCheckoutRequest, PaymentProvider};
use crate::return_url::{parse_return_query, ReturnSignal};
use crate::session::{CheckoutPhase, CheckoutSession, GatewayReference, PaymentIssue};

/// Orchestrator configuration
#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// Where the gateway sends the browser after payment
    pub success_url: String,

    /// Where the gateway sends the browser on cancellation
    pub cancel_url: String,

    /// Lifetime of the local "payment confirmed" bridge flag
    pub confirm_ttl: chrono::Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            success_url: "http://localhost:3000/checkout/return?status=success".into(),
            cancel_url: "http://localhost:3000/checkout/return?status=cancelled".into(),
            confirm_ttl: chrono::Duration::minutes(5),
        }
    }
}

/// One buyer's checkout, composed over the calculator, the router, the
/// attribution client and a payment provider.
///
/// Hold this outside any re-created render state: its guards (the view id,
/// the attempted-reference set) are what survive re-renders.
pub struct CheckoutOrchestrator {
    creator: CreatorId,
    pricing: PublishedPricing,
    config: FlowConfig,
    provider: Arc<dyn PaymentProvider>,
    attribution: Arc<AttributionClient>,
    geo: CachedGeoLocator,
    confirmed: Arc<dyn ConfirmedFlagStore>,
    session: CheckoutSession,

    /// References whose automatic verification already ran
    attempted_refs: HashSet<GatewayReference>,
}

impl CheckoutOrchestrator {
    pub fn new(
        creator: CreatorId,
        pricing: PublishedPricing,
        config: FlowConfig,
        provider: Arc<dyn PaymentProvider>,
        attribution: Arc<AttributionClient>,
        geo: CachedGeoLocator,
        confirmed: Arc<dyn ConfirmedFlagStore>,
    ) -> Self {
        Self {
            creator,
            pricing,
            config,
            provider,
            attribution,
            geo,
            confirmed,
            session: CheckoutSession::new(),
            attempted_refs: HashSet::new(),
        }
    }

    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    pub fn phase(&self) -> &CheckoutPhase {
        &self.session.phase
    }

    /// First render of the purchase screen. Safe to call again on a
    /// remount; the view record stays at-most-once.
    pub async fn on_mount(&mut self, referrer: &ReferrerMeta) {
        if let Some(view) = self.attribution.record_view_once(&self.creator, referrer).await {
            self.session.view_id = Some(view);
        }
        self.attribution.milestone(FunnelMilestone::ReachedPayment).await;
    }

    /// Best-effort geo refresh. Callers fire this without gating anything
    /// on it; an unresolved country routes as domestic.
    pub async fn refresh_payer_country(&self) {
        self.geo.refresh().await;
    }

    /// Buyer pressed pay. Validates locally, then quotes, routes and opens
    /// the hosted checkout; on success the caller navigates the browser to
    /// the returned URL and nothing more happens in-process.
    pub async fn submit(&mut self, email_input: &str, referrer: &ReferrerMeta) -> Result<CheckoutRedirect> {
        match self.session.phase {
            CheckoutPhase::Idle => {}
            CheckoutPhase::Success => return Err(FlowError::AlreadyCompleted),
            _ => return Err(FlowError::InvalidPhase),
        }
        self.session.field_error = None;

        // Guard failures stay local: still idle, no external call made.
        let email = match Email::parse(email_input) {
            Ok(email) => email,
            Err(_) => {
                self.session.field_error = Some(FieldError::Email);
                return Err(FlowError::Validation(FieldError::Email));
            }
        };
        if !self.pricing.is_payable() {
            self.session.field_error = Some(FieldError::Price);
            return Err(FlowError::Validation(FieldError::Price));
        }

        self.session.phase = CheckoutPhase::Processing;
        self.session.issue = None;

        // Synchronous fallback: never start checkout unattributed when a
        // record is still obtainable.
        if self.session.view_id.is_none() {
            self.session.view_id = self.attribution.ensure_view(&self.creator, referrer).await;
        }
        self.attribution.milestone(FunnelMilestone::StartedCheckout).await;

        let payer_country = self.geo.cached();
        let route = select_gateway(
            self.pricing.gateway,
            payer_country.as_ref(),
            &self.pricing.settlement_country,
        );
        let fee_quote = quote(
            &self.pricing.price,
            self.pricing.policy,
            self.pricing.rate,
            self.pricing.buffer_for(route.is_cross_border()),
        );

        let request = CreateCheckoutRequest {
            creator: self.creator.clone(),
            amount_minor: fee_quote.subscriber_pays,
            currency: fee_quote.currency.clone(),
            interval: self.pricing.interval,
            email,
            gateway: route.gateway,
            view_id: self.session.view_id.clone(),
            success_url: self.config.success_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
        };

        tracing::info!(
            creator = %self.creator,
            gateway = %route.gateway,
            amount = fee_quote.subscriber_pays,
            currency = %fee_quote.currency,
            cross_border = route.is_cross_border(),
            "creating checkout"
        );

        match self.provider.create_checkout(&request).await {
            Ok(redirect) => {
                self.session.phase = CheckoutPhase::Redirecting {
                    redirect_url: redirect.redirect_url.clone(),
                };
                Ok(redirect)
            }
            Err(e) => {
                tracing::warn!(error = %e, "checkout creation failed");
                // No charge assumed; retry is a fresh user action and the
                // retry counter is untouched.
                self.session.phase = CheckoutPhase::Idle;
                Err(FlowError::Creation(e))
            }
        }
    }

    /// Entry point on page load after the browser returns from the
    /// gateway. The only way `Verifying` is entered on load. Automatic
    /// verification runs at most once per reference; calling this again
    /// for the same reference (remount, double-invoke) is a no-op.
    pub async fn resume_from_return(&mut self, query: &str) -> Result<CheckoutPhase> {
        if self.session.phase.is_terminal() {
            return Ok(self.session.phase.clone());
        }

        let Some(signal) = parse_return_query(self.pricing.gateway, query) else {
            return Ok(self.session.phase.clone());
        };

        match signal {
            ReturnSignal::Cancelled => {
                self.session.phase = CheckoutPhase::Idle;
                Ok(self.session.phase.clone())
            }
            ReturnSignal::MissingReference => {
                self.session.phase = CheckoutPhase::Idle;
                self.session.issue = Some(PaymentIssue::InvalidSession);
                Err(FlowError::InvalidSession)
            }
            ReturnSignal::Completed(reference) => {
                self.session.gateway_reference = Some(reference.clone());
                if !self.attempted_refs.insert(reference.clone()) {
                    return Ok(self.session.phase.clone());
                }
                self.session.phase = CheckoutPhase::Verifying;
                self.verify(&reference).await
            }
        }
    }

    /// Explicit, user-triggered re-verification of the returned reference.
    /// The only sanctioned way to verify the same reference twice.
    pub async fn retry_verification(&mut self) -> Result<CheckoutPhase> {
        if self.session.phase.is_terminal() {
            return Err(FlowError::AlreadyCompleted);
        }
        let Some(reference) = self.session.gateway_reference.clone() else {
            return Err(FlowError::InvalidSession);
        };

        self.session.retry_count += 1;
        self.session.phase = CheckoutPhase::Verifying;
        self.verify(&reference).await
    }

    /// TTL-bounded UI bridge across the redirect; never consulted as the
    /// source of truth.
    pub fn recently_confirmed(&self, reference: &GatewayReference) -> bool {
        self.confirmed.is_confirmed(reference, Utc::now())
    }

    async fn verify(&mut self, reference: &GatewayReference) -> Result<CheckoutPhase> {
        tracing::info!(reference = %reference, "verifying payment");

        match self.provider.verify_payment(self.pricing.gateway, reference).await {
            Ok(outcome) if outcome.verified => {
                self.session.phase = CheckoutPhase::Success;
                self.session.issue = None;
                self.attribution.milestone(FunnelMilestone::CompletedCheckout).await;
                self.confirmed.put(reference, Utc::now() + self.config.confirm_ttl);
                Ok(CheckoutPhase::Success)
            }
            Ok(outcome) => {
                tracing::warn!(reference = %reference, status = %outcome.status, "payment not verified");
                self.session.phase = CheckoutPhase::Idle;
                self.session.issue = Some(PaymentIssue::VerificationFailed {
                    status: outcome.status.clone(),
                });
                Err(FlowError::VerificationRejected(outcome.status))
            }
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "verification call failed");
                self.session.phase = CheckoutPhase::Idle;
                self.session.issue = Some(PaymentIssue::VerificationFailed {
                    status: e.to_string(),
                });
                Err(FlowError::Verification(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use checkout_attribution::{AttributionError, PageViewApi, ViewId};
    use checkout_core::{
        BillingInterval, CountryCode, Currency, FeeRate, FeeSplitPolicy, Gateway, Price,
    };

    use crate::confirm::MemoryConfirmedFlags;
    use crate::geo::{GeoError, GeoLocator};
    use crate::provider::{PaymentVerification, ProviderError};

    struct MockProvider {
        create_calls: AtomicUsize,
        verify_calls: AtomicUsize,
        fail_create: bool,
        last_request: Mutex<Option<CreateCheckoutRequest>>,
        verify_outcomes: Mutex<VecDeque<std::result::Result<PaymentVerification, ProviderError>>>,
    }

    impl MockProvider {
        fn happy() -> Self {
            Self {
                create_calls: AtomicUsize::new(0),
                verify_calls: AtomicUsize::new(0),
                fail_create: false,
                last_request: Mutex::new(None),
                verify_outcomes: Mutex::new(VecDeque::new()),
            }
        }

        fn failing_create() -> Self {
            Self {
                fail_create: true,
                ..Self::happy()
            }
        }

        fn with_verify_outcomes(
            outcomes: Vec<std::result::Result<PaymentVerification, ProviderError>>,
        ) -> Self {
            let provider = Self::happy();
            *provider.verify_outcomes.lock().unwrap() = outcomes.into();
            provider
        }
    }

    #[async_trait]
    impl PaymentProvider for MockProvider {
        async fn create_checkout(
            &self,
            request: &CreateCheckoutRequest,
        ) -> std::result::Result<CheckoutRedirect, ProviderError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.fail_create {
                return Err(ProviderError::Network("connection reset".into()));
            }
            Ok(CheckoutRedirect {
                redirect_url: "https://gateway.test/pay/cs_123".into(),
            })
        }

        async fn verify_payment(
            &self,
            _gateway: Gateway,
            _reference: &GatewayReference,
        ) -> std::result::Result<PaymentVerification, ProviderError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            self.verify_outcomes.lock().unwrap().pop_front().unwrap_or(Ok(
                PaymentVerification {
                    verified: true,
                    status: "paid".into(),
                },
            ))
        }
    }

    #[derive(Default)]
    struct RecordingApi {
        record_calls: AtomicUsize,
        patches: Mutex<Vec<FunnelMilestone>>,
    }

    #[async_trait]
    impl PageViewApi for RecordingApi {
        async fn record_view(
            &self,
            _profile: &CreatorId,
            _referrer: &ReferrerMeta,
        ) -> std::result::Result<ViewId, AttributionError> {
            self.record_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ViewId::from_string("view-1"))
        }

        async fn patch_view(
            &self,
            _view: &ViewId,
            milestone: FunnelMilestone,
        ) -> std::result::Result<(), AttributionError> {
            self.patches.lock().unwrap().push(milestone);
            Ok(())
        }
    }

    impl RecordingApi {
        fn patch_count(&self, milestone: FunnelMilestone) -> usize {
            self.patches.lock().unwrap().iter().filter(|m| **m == milestone).count()
        }
    }

    struct StaticGeo(Option<&'static str>);

    #[async_trait]
    impl GeoLocator for StaticGeo {
        async fn detect_country(&self) -> std::result::Result<String, GeoError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| GeoError::Lookup("unavailable".into()))
        }
    }

    fn pricing(minor: u64) -> PublishedPricing {
        PublishedPricing {
            price: Price::new(minor, Currency::parse("USD").unwrap()).unwrap(),
            interval: BillingInterval::Monthly,
            policy: FeeSplitPolicy::PassToSubscriber,
            rate: FeeRate::from_bps(900).unwrap(),
            cross_border_buffer: FeeRate::from_bps(150).unwrap(),
            settlement_country: CountryCode::parse("US").unwrap(),
            gateway: Gateway::Primary,
        }
    }

    struct Harness {
        provider: Arc<MockProvider>,
        api: Arc<RecordingApi>,
        orchestrator: CheckoutOrchestrator,
    }

    fn harness_with(provider: MockProvider, pricing_cfg: PublishedPricing, geo: StaticGeo) -> Harness {
        let provider = Arc::new(provider);
        let api = Arc::new(RecordingApi::default());
        let orchestrator = CheckoutOrchestrator::new(
            CreatorId::new("creator-1"),
            pricing_cfg,
            FlowConfig::default(),
            provider.clone(),
            Arc::new(AttributionClient::new(api.clone())),
            CachedGeoLocator::new(Arc::new(geo)),
            Arc::new(MemoryConfirmedFlags::new()),
        );
        Harness {
            provider,
            api,
            orchestrator,
        }
    }

    fn harness() -> Harness {
        harness_with(MockProvider::happy(), pricing(1000), StaticGeo(Some("US")))
    }

    #[tokio::test]
    async fn test_empty_email_keeps_idle_and_calls_nothing() {
        let mut h = harness();
        h.orchestrator.on_mount(&ReferrerMeta::default()).await;

        let err = h.orchestrator.submit("", &ReferrerMeta::default()).await.unwrap_err();
        assert!(matches!(err, FlowError::Validation(FieldError::Email)));
        assert_eq!(*h.orchestrator.phase(), CheckoutPhase::Idle);
        assert_eq!(h.orchestrator.session().field_error, Some(FieldError::Email));
        assert_eq!(h.provider.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.api.patch_count(FunnelMilestone::StartedCheckout), 0);
    }

    #[tokio::test]
    async fn test_zero_price_is_a_field_error_not_a_checkout_failure() {
        let mut h = harness_with(MockProvider::happy(), pricing(0), StaticGeo(Some("US")));

        let err = h
            .orchestrator
            .submit("buyer@example.com", &ReferrerMeta::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Validation(FieldError::Price)));
        assert!(!err.is_retryable());
        assert_eq!(h.provider.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_double_mount_records_one_view() {
        let mut h = harness();
        h.orchestrator.on_mount(&ReferrerMeta::default()).await;
        h.orchestrator.on_mount(&ReferrerMeta::default()).await;

        assert_eq!(h.api.record_calls.load(Ordering::SeqCst), 1);
        assert!(h.orchestrator.session().view_id.is_some());
    }

    #[tokio::test]
    async fn test_happy_submit_redirects_with_domestic_quote() {
        let mut h = harness();
        h.orchestrator.on_mount(&ReferrerMeta::default()).await;
        h.orchestrator.refresh_payer_country().await;

        let redirect = h
            .orchestrator
            .submit("buyer@example.com", &ReferrerMeta::default())
            .await
            .unwrap();
        assert_eq!(redirect.redirect_url, "https://gateway.test/pay/cs_123");
        assert!(matches!(h.orchestrator.phase(), CheckoutPhase::Redirecting { .. }));
        assert_eq!(h.provider.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.api.patch_count(FunnelMilestone::StartedCheckout), 1);

        // pass_to_subscriber at 9%, domestic: round(1000 / 0.91)
        let request = h.provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.amount_minor, 1099);
        assert_eq!(request.gateway, Gateway::Primary);
        assert!(request.view_id.is_some());
    }

    #[tokio::test]
    async fn test_cross_border_payer_is_quoted_with_buffer() {
        let mut h = harness_with(MockProvider::happy(), pricing(1000), StaticGeo(Some("GB")));
        h.orchestrator.refresh_payer_country().await;

        h.orchestrator
            .submit("buyer@example.com", &ReferrerMeta::default())
            .await
            .unwrap();

        // 9% + 1.5% buffer: round(1000 / 0.895)
        let request = h.provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.amount_minor, 1117);
    }

    #[tokio::test]
    async fn test_unresolved_geo_quotes_domestic() {
        // Buyer clicks pay before detection resolves; checkout proceeds
        // on the domestic path instead of blocking.
        let mut h = harness_with(MockProvider::happy(), pricing(1000), StaticGeo(None));

        h.orchestrator
            .submit("buyer@example.com", &ReferrerMeta::default())
            .await
            .unwrap();
        let request = h.provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.amount_minor, 1099);
    }

    #[tokio::test]
    async fn test_submit_records_view_when_mount_never_ran() {
        // Buyer clicked pay before (or without) the mount record resolving
        let mut h = harness();

        h.orchestrator
            .submit("buyer@example.com", &ReferrerMeta::default())
            .await
            .unwrap();
        assert_eq!(h.api.record_calls.load(Ordering::SeqCst), 1);
        let request = h.provider.last_request.lock().unwrap().clone().unwrap();
        assert!(request.view_id.is_some());
    }

    #[tokio::test]
    async fn test_creation_failure_returns_to_idle_and_is_retryable() {
        let mut h = harness_with(MockProvider::failing_create(), pricing(1000), StaticGeo(Some("US")));

        let err = h
            .orchestrator
            .submit("buyer@example.com", &ReferrerMeta::default())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(*h.orchestrator.phase(), CheckoutPhase::Idle);
        assert_eq!(h.orchestrator.session().retry_count, 0);

        // Retry is a fresh user action, not automatic
        let _ = h
            .orchestrator
            .submit("buyer@example.com", &ReferrerMeta::default())
            .await;
        assert_eq!(h.provider.create_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_return_with_reference_verifies_once() {
        let mut h = harness();
        h.orchestrator.on_mount(&ReferrerMeta::default()).await;

        let phase = h
            .orchestrator
            .resume_from_return("status=success&session_id=cs_123")
            .await
            .unwrap();
        assert_eq!(phase, CheckoutPhase::Success);
        assert_eq!(h.provider.verify_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.api.patch_count(FunnelMilestone::CompletedCheckout), 1);

        // Double-invoke mount: same query parsed again, no second call
        let phase = h
            .orchestrator
            .resume_from_return("status=success&session_id=cs_123")
            .await
            .unwrap();
        assert_eq!(phase, CheckoutPhase::Success);
        assert_eq!(h.provider.verify_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.api.patch_count(FunnelMilestone::CompletedCheckout), 1);
    }

    #[tokio::test]
    async fn test_success_signal_without_reference_is_invalid_session() {
        let mut h = harness();

        let err = h.orchestrator.resume_from_return("status=success").await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidSession));
        assert_eq!(*h.orchestrator.phase(), CheckoutPhase::Idle);
        assert_eq!(h.orchestrator.session().issue.clone(), Some(PaymentIssue::InvalidSession));
        assert_eq!(h.provider.verify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_returns_quietly_to_idle() {
        let mut h = harness();

        let phase = h.orchestrator.resume_from_return("status=cancelled").await.unwrap();
        assert_eq!(phase, CheckoutPhase::Idle);
        assert!(h.orchestrator.session().issue.is_none());
    }

    #[tokio::test]
    async fn test_failed_verification_surfaces_payment_issue() {
        let provider = MockProvider::with_verify_outcomes(vec![Ok(PaymentVerification {
            verified: false,
            status: "abandoned".into(),
        })]);
        let mut h = harness_with(provider, pricing(1000), StaticGeo(Some("US")));

        let err = h
            .orchestrator
            .resume_from_return("status=success&session_id=cs_123")
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::VerificationRejected(_)));
        assert!(!err.is_retryable());
        assert_eq!(*h.orchestrator.phase(), CheckoutPhase::Idle);
        assert_eq!(
            h.orchestrator.session().issue.clone(),
            Some(PaymentIssue::VerificationFailed {
                status: "abandoned".into()
            })
        );
        // money may have moved; no silent auto-retry happened
        assert_eq!(h.provider.verify_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_retry_verifies_again_and_completes_once() {
        let provider = MockProvider::with_verify_outcomes(vec![
            Err(ProviderError::Network("timeout".into())),
            Ok(PaymentVerification {
                verified: true,
                status: "paid".into(),
            }),
        ]);
        let mut h = harness_with(provider, pricing(1000), StaticGeo(Some("US")));
        h.orchestrator.on_mount(&ReferrerMeta::default()).await;

        let err = h
            .orchestrator
            .resume_from_return("status=success&session_id=cs_123")
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Verification(_)));
        assert_eq!(h.provider.verify_calls.load(Ordering::SeqCst), 1);

        let phase = h.orchestrator.retry_verification().await.unwrap();
        assert_eq!(phase, CheckoutPhase::Success);
        assert_eq!(h.provider.verify_calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.orchestrator.session().retry_count, 1);
        // completed_checkout patched exactly once in total
        assert_eq!(h.api.patch_count(FunnelMilestone::CompletedCheckout), 1);
    }

    #[tokio::test]
    async fn test_retry_without_reference_is_rejected() {
        let mut h = harness();
        let err = h.orchestrator.retry_verification().await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidSession));
    }

    #[tokio::test]
    async fn test_success_is_sticky() {
        let mut h = harness();
        h.orchestrator
            .resume_from_return("status=success&session_id=cs_123")
            .await
            .unwrap();

        let err = h
            .orchestrator
            .submit("buyer@example.com", &ReferrerMeta::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::AlreadyCompleted));
        assert_eq!(*h.orchestrator.phase(), CheckoutPhase::Success);

        let err = h.orchestrator.retry_verification().await.unwrap_err();
        assert!(matches!(err, FlowError::AlreadyCompleted));
        assert_eq!(h.provider.verify_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirmed_flag_bridges_the_redirect() {
        let mut h = harness();
        let reference = GatewayReference::from_string("cs_123");
        assert!(!h.orchestrator.recently_confirmed(&reference));

        h.orchestrator
            .resume_from_return("status=success&session_id=cs_123")
            .await
            .unwrap();
        assert!(h.orchestrator.recently_confirmed(&reference));
    }
}
