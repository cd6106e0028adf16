use dashmap::DashMap;

// Throttling state for one (scope, identifier, action) key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_reset_at: u64, // absolute unix millis
}

impl RateLimitEntry {
    pub fn fresh(now: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            window_reset_at: now.saturating_add(window_ms),
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.window_reset_at
    }
}

/// Backing storage for rate-limit counters.
///
/// The limiter serialises access per key, so implementations only need to be
/// safe for concurrent use across different keys. A distributed backend can be
/// dropped in here without touching the window policy.
pub trait RateLimitStore: Send + Sync {
    fn get(&self, key: &str) -> Option<RateLimitEntry>;
    fn set(&self, key: &str, entry: RateLimitEntry);
    fn delete(&self, key: &str);
    /// Snapshot of every tracked key and its entry.
    fn entries(&self) -> Vec<(String, RateLimitEntry)>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Process-local store; state is lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|e| *e.value())
    }

    fn set(&self, key: &str, entry: RateLimitEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    fn entries(&self) -> Vec<(String, RateLimitEntry)> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
