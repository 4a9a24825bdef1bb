//! Session-Scoped Cache
//!
//! A small bounded key-value store owned by whoever created it, used for
//! session bookkeeping (geo lookups, confirmed-payment flags). Explicitly
//! passed, never a process-wide singleton; insertion order is evicted
//! first once the cap is hit.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Mutex;

struct CacheInner<K, V> {
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

/// Bounded session store with insertion-order eviction
pub struct SessionCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
    cap: usize,
}

impl<K, V> SessionCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `cap` entries (minimum one)
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            cap: cap.max(1),
        }
    }

    /// Insert or replace a value, evicting the oldest entry at capacity
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.lock();
        if inner.map.contains_key(&key) {
            inner.map.insert(key, value);
            return;
        }
        while inner.map.len() >= self.cap {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
            } else {
                break;
            }
        }
        inner.order.push_back(key.clone());
        inner.map.insert(key, value);
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().map.get(key).cloned()
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        inner.order.retain(|k| k != key);
        inner.map.remove(key)
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner<K, V>> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
