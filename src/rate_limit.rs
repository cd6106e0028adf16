//! Fixed-window request limiter.
//!
//! Counters live in an injectable [`RateLimitStore`]. Read-modify-write on a
//! key is serialised through a sharded lock so concurrent requests for the same
//! key can never be admitted past quota. State is per process: several server
//! instances behind a load balancer each enforce their own quota unless they
//! share a store.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::{Clock, SystemClock};
use crate::policy::{RateLimitKey, RateLimitPolicy};
use crate::store::{InMemoryStore, RateLimitEntry, RateLimitStore};

const LOCK_SHARDS: usize = 64;

// Outcome of one check, also the source of X-RateLimit-* headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    pub success: bool,
    pub remaining: u32,
    pub limit: u32,
    pub reset: u64, // unix millis when the window closes
}

impl RateLimitResult {
    // Whole seconds until reset, never below 1
    pub fn retry_after_secs(&self, now_millis: u64) -> u64 {
        let wait = self.reset.saturating_sub(now_millis);
        wait.div_ceil(1000).max(1)
    }
}

pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    shards: Vec<Mutex<()>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
    }
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            shards: (0..LOCK_SHARDS).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    pub fn tracked_keys(&self) -> usize {
        self.store.len()
    }

    fn lock_for(&self, key: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.shards.len();
        // The guarded data is (), so a poisoned lock carries nothing stale
        self.shards[idx]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Counts one request against `key` and reports whether it is admitted.
    ///
    /// Callers validate `key`, `window_ms` and `max_requests` beforehand; a
    /// denied request does not touch the stored entry.
    pub fn check_and_consume(&self, key: &str, window_ms: u64, max_requests: u32) -> RateLimitResult {
        let _guard = self.lock_for(key);
        let now = self.clock.now_millis();

        match self.store.get(key) {
            Some(mut entry) if !entry.is_expired(now) => {
                if entry.count >= max_requests {
                    return RateLimitResult {
                        success: false,
                        remaining: 0,
                        limit: max_requests,
                        reset: entry.window_reset_at,
                    };
                }
                entry.count += 1;
                self.store.set(key, entry);
                RateLimitResult {
                    success: true,
                    remaining: max_requests.saturating_sub(entry.count),
                    limit: max_requests,
                    reset: entry.window_reset_at,
                }
            }
            // missing or expired: start a new window
            _ => {
                let entry = RateLimitEntry::fresh(now, window_ms);
                self.store.set(key, entry);
                RateLimitResult {
                    success: true,
                    remaining: max_requests.saturating_sub(1),
                    limit: max_requests,
                    reset: entry.window_reset_at,
                }
            }
        }
    }

    pub fn check_policy(&self, key: &RateLimitKey, policy: RateLimitPolicy) -> RateLimitResult {
        self.check_and_consume(&key.to_string(), policy.window_ms, policy.max_requests)
    }

    /// Drops every entry whose window has closed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut removed = 0;

        for (key, entry) in self.store.entries() {
            if !entry.is_expired(now) {
                continue;
            }
            let _guard = self.lock_for(&key);
            // re-read: the key may have been restarted since the snapshot
            if let Some(current) = self.store.get(&key) {
                if current.is_expired(now) {
                    self.store.delete(&key);
                    removed += 1;
                }
            }
        }
        removed
    }
}

// Short stable digest of a key, for logs that must not carry wallet/IP values
pub fn key_fingerprint(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn limiter() -> (RateLimiter, Arc<ManualClock>, Arc<InMemoryStore>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = Arc::new(InMemoryStore::new());
        let limiter = RateLimiter::new(store.clone(), clock.clone());
        (limiter, clock, store)
    }

    #[test]
    fn five_purchases_then_denied() {
        let (limiter, _, _) = limiter();
        let key = "wallet:purchase:0xabc";

        let remaining: Vec<u32> = (0..5)
            .map(|_| {
                let r = limiter.check_and_consume(key, 60_000, 5);
                assert!(r.success);
                r.remaining
            })
            .collect();
        assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

        let denied = limiter.check_and_consume(key, 60_000, 5);
        assert!(!denied.success);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.limit, 5);
        assert_eq!(denied.reset, 1_060_000);
    }

    #[test]
    fn denied_request_does_not_mutate_entry() {
        let (limiter, _, store) = limiter();
        for _ in 0..3 {
            limiter.check_and_consume("k", 1_000, 2);
        }
        assert_eq!(store.get("k").unwrap().count, 2);
    }

    #[test]
    fn window_resets_once_reset_time_reached() {
        let (limiter, clock, _) = limiter();
        for _ in 0..3 {
            limiter.check_and_consume("k", 60_000, 3);
        }
        assert!(!limiter.check_and_consume("k", 60_000, 3).success);

        clock.advance(59_999);
        assert!(!limiter.check_and_consume("k", 60_000, 3).success);

        clock.advance(1);
        let r = limiter.check_and_consume("k", 60_000, 3);
        assert!(r.success);
        assert_eq!(r.remaining, 2);
        assert_eq!(r.reset, clock.now_millis() + 60_000);
    }

    #[test]
    fn remaining_decreases_by_one_and_never_underflows() {
        let (limiter, _, _) = limiter();
        let mut last = None;
        for _ in 0..20 {
            let r = limiter.check_and_consume("k", 10_000, 10);
            if r.success {
                if let Some(prev) = last {
                    assert_eq!(r.remaining + 1, prev);
                }
                last = Some(r.remaining);
            } else {
                assert_eq!(r.remaining, 0);
            }
        }
    }

    #[test]
    fn keys_are_independent() {
        let (limiter, _, store) = limiter();
        limiter.check_and_consume("a", 60_000, 1);
        assert!(!limiter.check_and_consume("a", 60_000, 1).success);

        let b = limiter.check_and_consume("b", 60_000, 1);
        assert!(b.success);
        assert_eq!(store.get("a").unwrap().count, 1);
        assert_eq!(store.get("b").unwrap().count, 1);
    }

    #[test]
    fn sweep_removes_only_expired_and_is_idempotent() {
        let (limiter, clock, store) = limiter();
        limiter.check_and_consume("short", 1_000, 5);
        limiter.check_and_consume("long", 60_000, 5);

        clock.advance(1_000);
        assert_eq!(limiter.sweep_expired(), 1);
        let first: Vec<String> = store.entries().into_iter().map(|(k, _)| k).collect();

        assert_eq!(limiter.sweep_expired(), 0);
        let second: Vec<String> = store.entries().into_iter().map(|(k, _)| k).collect();

        assert_eq!(first, vec!["long".to_string()]);
        assert_eq!(first, second);
    }

    #[test]
    fn swept_key_starts_a_fresh_window() {
        let (limiter, clock, _) = limiter();
        limiter.check_and_consume("k", 500, 1);
        clock.advance(600);
        limiter.sweep_expired();

        let r = limiter.check_and_consume("k", 500, 1);
        assert!(r.success);
        assert_eq!(r.remaining, 0);
    }

    // Store whose listing lags behind its contents, as a sweep would see it
    // when a key is restarted between the snapshot and the delete.
    struct StaleListingStore {
        live: InMemoryStore,
        listing: Mutex<Vec<(String, RateLimitEntry)>>,
    }

    impl RateLimitStore for StaleListingStore {
        fn get(&self, key: &str) -> Option<RateLimitEntry> {
            self.live.get(key)
        }

        fn set(&self, key: &str, entry: RateLimitEntry) {
            self.live.set(key, entry);
        }

        fn delete(&self, key: &str) {
            self.live.delete(key);
        }

        fn entries(&self) -> Vec<(String, RateLimitEntry)> {
            self.listing.lock().unwrap().clone()
        }

        fn len(&self) -> usize {
            self.live.len()
        }
    }

    #[test]
    fn sweep_keeps_window_restarted_after_snapshot() {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = Arc::new(StaleListingStore {
            live: InMemoryStore::new(),
            listing: Mutex::new(Vec::new()),
        });
        let limiter = RateLimiter::new(store.clone(), clock.clone());

        limiter.check_and_consume("k", 1_000, 5);
        let expired_view = store.live.entries();

        // window closes, then the key is hit again and restarts
        clock.advance(1_000);
        let restarted = limiter.check_and_consume("k", 1_000, 5);
        assert!(restarted.success);
        *store.listing.lock().unwrap() = expired_view;

        assert_eq!(limiter.sweep_expired(), 0);
        let live = store.get("k").unwrap();
        assert_eq!(live.count, 1);
        assert_eq!(live.window_reset_at, 1_002_000);

        // a listing that is stale but still expired is removed as usual
        clock.advance(1_000);
        assert_eq!(limiter.sweep_expired(), 1);
        assert!(store.get("k").is_none());
    }

    #[test]
    fn concurrent_callers_never_exceed_quota() {
        let (limiter, _, _) = limiter();
        let admitted = AtomicU32::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        if limiter.check_and_consume("hot", 60_000, 50).success {
                            admitted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert_eq!(admitted.load(Ordering::Relaxed), 50);
    }

    #[test]
    fn check_policy_uses_rendered_key() {
        let (limiter, _, store) = limiter();
        let key = RateLimitKey::wallet(crate::policy::ActionCategory::Purchase, "0xabc").unwrap();
        limiter.check_policy(&key, RateLimitPolicy::new(60_000, 5).unwrap());
        assert!(store.get("wallet:purchase:0xabc").is_some());
    }

    #[test]
    fn retry_after_rounds_up_to_whole_seconds() {
        let r = RateLimitResult {
            success: false,
            remaining: 0,
            limit: 1,
            reset: 10_500,
        };
        assert_eq!(r.retry_after_secs(9_000), 2);
        assert_eq!(r.retry_after_secs(10_500), 1);
    }

    #[test]
    fn fingerprint_hides_raw_key() {
        let fp = key_fingerprint("wallet:purchase:0xabc");
        assert_eq!(fp.len(), 12);
        assert!(!fp.contains("0xabc"));
        assert_eq!(fp, key_fingerprint("wallet:purchase:0xabc"));
    }
}
