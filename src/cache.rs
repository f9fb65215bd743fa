//! Route decision caching.
//!
//! This module provides [`DecisionCache`], an LRU map from URL string to
//! [`RouteDecision`]. It is gated behind the `cache` feature flag and uses
//! the [`lru`] crate internally.
//!
//! Entries are tagged with the registry generation they were resolved
//! against. When the registry changes, the next lookup sees a newer
//! generation and drops everything, so a cached decision never outlives the
//! registrations it was computed from.
//!
//! [`CacheStats`] tracks hits, misses, and invalidations so you can monitor
//! cache effectiveness at runtime.

use crate::resolve::RouteDecision;
use crate::{debug_log, trace_log};
use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;

/// Counters tracking cache hit/miss rates and invalidations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered from the cache.
    pub hits: usize,
    /// Number of lookups that had to resolve.
    pub misses: usize,
    /// Number of full cache invalidations.
    pub invalidations: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of route decisions keyed by URL.
pub struct DecisionCache<R> {
    entries: LruCache<String, RouteDecision<R>>,
    generation: u64,
    stats: CacheStats,
}

impl<R> DecisionCache<R> {
    /// Create a cache holding at most `capacity` decisions.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            generation: 0,
            stats: CacheStats::default(),
        }
    }

    /// Drop all entries if `generation` differs from the cached one.
    fn sync(&mut self, generation: u64) {
        if self.generation != generation {
            if !self.entries.is_empty() {
                self.clear();
            }
            self.generation = generation;
        }
    }

    /// Look up `url` for registry `generation`. Updates hit/miss stats.
    pub fn get(&mut self, url: &str, generation: u64) -> Option<RouteDecision<R>> {
        self.sync(generation);
        if let Some(decision) = self.entries.get(url) {
            self.stats.hits += 1;
            trace_log!("Decision cache hit for '{}'", url);
            Some(decision.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Decision cache miss for '{}'", url);
            None
        }
    }

    /// Store `decision`, resolved against registry `generation`.
    ///
    /// A decision from an older generation is discarded.
    pub fn insert(&mut self, url: String, decision: RouteDecision<R>, generation: u64) {
        if generation < self.generation {
            return;
        }
        self.sync(generation);
        self.entries.push(url, decision);
    }

    /// Remove all entries and increment the invalidation counter.
    pub fn clear(&mut self) {
        let len = self.entries.len();
        self.entries.clear();
        self.stats.invalidations += 1;
        debug_log!(
            "Decision cache cleared: {} entries removed ({} total invalidations, hit rate: {:.1}%)",
            len,
            self.stats.invalidations,
            self.stats.hit_rate() * 100.0
        );
    }

    /// Return a reference to the current cache statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Reset all counters in [`CacheStats`] to zero.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Number of cached decisions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R> fmt::Debug for DecisionCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("generation", &self.generation)
            .field("stats", &self.stats)
            .finish()
    }
}
