//! Memoization of provider answers keyed by exact prompt text.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::config::CacheConfig;
use crate::llm::TextGenerator;
use crate::llm::error::ProviderResult;

/// Cache entry with optional TTL.
struct CacheEntry {
    text: String,
    seq: u64,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Thread-safe prompt → answer cache.
///
/// With `max_entries == 0` and no TTL the cache is unbounded and lives as
/// long as the process. A TTL hides and lazily purges stale entries; a
/// positive `max_entries` evicts the oldest insertions once full.
pub struct PromptCache {
    config: CacheConfig,
    entries: DashMap<String, CacheEntry>,
    next_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PromptCache {
    /// Create a new cache with the given configuration.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create an enabled, unbounded, non-expiring cache.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Look up a previously stored answer.
    #[must_use]
    pub fn get(&self, prompt: &str) -> Option<String> {
        if !self.config.enabled {
            return None;
        }

        let now = Instant::now();
        let found = self.entries.get(prompt).and_then(|entry| {
            if entry.is_expired(now) {
                drop(entry);
                // Only remove what is still stale; a racing insert may have replaced it.
                self.entries.remove_if(prompt, |_, e| e.is_expired(now));
                None
            } else {
                Some(entry.text.clone())
            }
        });

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store an answer unless a live one already exists for this prompt.
    ///
    /// Returns the answer that ends up cached, which is the earlier one when
    /// two callers race on the same prompt.
    pub fn insert_if_absent(&self, prompt: &str, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }

        if !self.entries.contains_key(prompt) {
            self.enforce_max_entries();
        }

        let now = Instant::now();
        let fresh = CacheEntry {
            text: text.to_string(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            expires_at: self.ttl().map(|ttl| now + ttl),
        };

        match self.entries.entry(prompt.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().is_expired(now) => {
                occupied.insert(fresh);
                text.to_string()
            }
            Entry::Occupied(occupied) => occupied.get().text.clone(),
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                text.to_string()
            }
        }
    }

    /// Drop every entry and reset statistics.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Number of stored entries, expired ones included until purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Remove expired entries.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }

    fn ttl(&self) -> Option<Duration> {
        self.config.ttl_seconds.map(Duration::from_secs)
    }

    /// Make room for one more entry by purging expired ones, then the oldest.
    fn enforce_max_entries(&self) {
        let max = self.config.max_entries;
        if max == 0 || self.entries.len() < max {
            return;
        }

        self.cleanup_expired();
        let len = self.entries.len();
        if len < max {
            return;
        }

        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|entry| (entry.seq, entry.key().clone()))
            .collect();
        by_age.sort_unstable_by_key(|(seq, _)| *seq);

        // Other threads may evict concurrently, so `len` can be stale.
        let to_remove = (len + 1).saturating_sub(max);
        for (_, key) in by_age.into_iter().take(to_remove) {
            self.entries.remove(&key);
        }
        debug!(evicted = to_remove, "Prompt cache full, evicted oldest entries");
    }
}

/// Cache statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored entries.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell through to the provider.
    pub misses: u64,
}

/// A generator that consults a [`PromptCache`] before calling the inner one.
pub struct CachedGenerator<G> {
    inner: G,
    cache: Arc<PromptCache>,
}

impl<G: TextGenerator> CachedGenerator<G> {
    /// Wrap `inner` with `cache`.
    #[must_use]
    pub const fn new(inner: G, cache: Arc<PromptCache>) -> Self {
        Self { inner, cache }
    }

    /// The cache consulted by this generator.
    #[must_use]
    pub const fn cache(&self) -> &Arc<PromptCache> {
        &self.cache
    }
}

impl<G: TextGenerator> TextGenerator for CachedGenerator<G> {
    fn generate(&self, prompt: &str) -> ProviderResult<String> {
        if let Some(hit) = self.cache.get(prompt) {
            debug!(prompt_len = prompt.len(), "Cache hit for prompt");
            return Ok(hit);
        }

        let text = self.inner.generate(prompt)?;
        Ok(self.cache.insert_if_absent(prompt, &text))
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.cache.stats())
    }
}
