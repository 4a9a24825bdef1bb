//! Confirmed-Payment Flag
//!
//! A short-TTL local flag that bridges UI continuity across the redirect
//! round-trip. Never the source of truth for whether payment succeeded;
//! re-entry with a reference always re-derives truth from verification.

use chrono::{DateTime, Utc};

use checkout_attribution::SessionCache;

use crate::session::GatewayReference;

/// Durable-for-minutes client storage of "payment confirmed" markers
pub trait ConfirmedFlagStore: Send + Sync {
    /// Record a confirmation with an explicit expiry
    fn put(&self, reference: &GatewayReference, expires_at: DateTime<Utc>);

    /// Whether a still-unexpired confirmation exists
    fn is_confirmed(&self, reference: &GatewayReference, now: DateTime<Utc>) -> bool;
}

/// In-memory flag store over the bounded session cache
pub struct MemoryConfirmedFlags {
    flags: SessionCache<String, DateTime<Utc>>,
}

impl MemoryConfirmedFlags {
    pub fn new() -> Self {
        Self {
            flags: SessionCache::with_capacity(16),
        }
    }
}

impl Default for MemoryConfirmedFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmedFlagStore for MemoryConfirmedFlags {
    fn put(&self, reference: &GatewayReference, expires_at: DateTime<Utc>) {
        self.flags.insert(reference.as_str().to_string(), expires_at);
    }

    fn is_confirmed(&self, reference: &GatewayReference, now: DateTime<Utc>) -> bool {
        let key = reference.as_str().to_string();
        match self.flags.get(&key) {
            Some(expires_at) if now < expires_at => true,
            Some(_) => {
                // expired entries are dropped on sight
                self.flags.remove(&key);
                false
            }
            None => false,
        }
    }
}
