//! Funnel Model
//!
//! A page view gets an opaque id, then named milestones are patched
//! against it for conversion analysis. Milestones are monotonic: once
//! reached, a milestone never unhappens and patching it again is a no-op.

use serde::{Deserialize, Serialize};

/// Opaque handle to a recorded page view. Ids are minted by the analytics
/// service; this side only carries them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(String);

impl ViewId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the visitor came from, best-effort
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReferrerMeta {
    /// Document referrer, if any
    pub referrer: Option<String>,

    /// `utm_source` query value, if any
    pub utm_source: Option<String>,
}

/// Named conversion checkpoint recorded against a page view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunnelMilestone {
    ReachedPayment,
    StartedCheckout,
    CompletedCheckout,
}

impl FunnelMilestone {
    /// Wire name of the milestone field in a view patch
    pub fn field_name(self) -> &'static str {
        match self {
            Self::ReachedPayment => "reachedPayment",
            Self::StartedCheckout => "startedCheckout",
            Self::CompletedCheckout => "completedCheckout",
        }
    }
}

impl std::fmt::Display for FunnelMilestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Monotonic milestone flags for one view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelState {
    pub reached_payment: bool,
    pub started_checkout: bool,
    pub completed_checkout: bool,
}

impl FunnelState {
    /// Mark a milestone reached. Idempotent; other milestones untouched.
    pub fn apply(&mut self, milestone: FunnelMilestone) {
        match milestone {
            FunnelMilestone::ReachedPayment => self.reached_payment = true,
            FunnelMilestone::StartedCheckout => self.started_checkout = true,
            FunnelMilestone::CompletedCheckout => self.completed_checkout = true,
        }
    }

    pub fn contains(&self, milestone: FunnelMilestone) -> bool {
        match milestone {
            FunnelMilestone::ReachedPayment => self.reached_payment,
            FunnelMilestone::StartedCheckout => self.started_checkout,
            FunnelMilestone::CompletedCheckout => self.completed_checkout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_idempotent_and_isolated() {
        let mut funnel = FunnelState::default();
        funnel.apply(FunnelMilestone::ReachedPayment);

        let before = funnel;
        funnel.apply(FunnelMilestone::StartedCheckout);
        funnel.apply(FunnelMilestone::StartedCheckout);

        assert!(funnel.started_checkout);
        assert_eq!(funnel.reached_payment, before.reached_payment);
        assert!(!funnel.completed_checkout);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(FunnelMilestone::ReachedPayment.field_name(), "reachedPayment");
        assert_eq!(FunnelMilestone::StartedCheckout.field_name(), "startedCheckout");
        assert_eq!(FunnelMilestone::CompletedCheckout.field_name(), "completedCheckout");
    }
}
