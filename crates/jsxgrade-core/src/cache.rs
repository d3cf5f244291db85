//! Opt-in LRU cache of feature contexts keyed by the SHA-256 of the source.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use sha2::{Digest, Sha256};

use crate::context::FeatureContext;

type Key = [u8; 32];

struct Entry {
    context: Arc<FeatureContext>,
    last_used: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<Key, Entry>,
    tick: u64,
    generation: u64,
    hits: u64,
    misses: u64,
}

/// Hit and miss counters since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub generation: u64,
}

/// Thread-safe LRU of [`FeatureContext`] values.
///
/// Contexts are immutable once produced, so entries are shared through
/// `Arc`. A capacity of zero disables caching entirely.
pub struct ContextCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl ContextCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn key(source: &str) -> Key {
        Sha256::digest(source.as_bytes()).into()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The inner state stays consistent across a panic in a caller, so a
        // poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, source: &str) -> Option<Arc<FeatureContext>> {
        if self.capacity == 0 {
            return None;
        }
        let key = Self::key(source);
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;
        let hit = inner.entries.get_mut(&key).map(|entry| {
            entry.last_used = tick;
            Arc::clone(&entry.context)
        });
        if hit.is_some() {
            inner.hits += 1;
        } else {
            inner.misses += 1;
        }
        hit
    }

    pub fn insert(&self, source: &str, context: Arc<FeatureContext>) {
        if self.capacity == 0 {
            return;
        }
        let key = Self::key(source);
        let mut inner = self.lock();
        inner.tick += 1;
        let last_used = inner.tick;
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| *key);
            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
            }
        }
        inner.entries.insert(key, Entry { context, last_used });
    }

    /// Return the cached context for `source`, computing it on a miss.
    pub fn get_or_insert_with<F>(&self, source: &str, compute: F) -> Arc<FeatureContext>
    where
        F: FnOnce() -> FeatureContext,
    {
        if let Some(hit) = self.get(source) {
            return hit;
        }
        let context = Arc::new(compute());
        self.insert(source, Arc::clone(&context));
        context
    }

    /// Drop every entry and start a new generation.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            len: inner.entries.len(),
            generation: inner.generation,
        }
    }
}

impl std::fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCache")
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish()
    }
}
