//! Process-wide memo of SID → account lookups.

use crate::AccountLookup;
use core::num::NonZeroUsize;
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;

/// Bounded least-recently-used map from SID text to a reverse lookup result.
///
/// Every access goes through one internal lock, independent from any
/// [`PolicyClient`](crate::PolicyClient) lock. Entries are never invalidated
/// other than by eviction or [`SidCache::clear`]: a renamed account keeps its
/// old name here until it falls out.
#[derive(Debug)]
pub struct SidCache {
    entries: Mutex<LruCache<String, AccountLookup>>,
}

static GLOBAL: Lazy<Arc<SidCache>> = Lazy::new(|| Arc::new(SidCache::default()));

impl SidCache {
    /// Capacity of [`SidCache::global`].
    pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(4096) {
        Some(capacity) => capacity,
        None => NonZeroUsize::MIN,
    };

    /// Creates an empty cache holding at most `capacity` entries.
    #[inline]
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The shared instance, created on first use.
    #[inline]
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Returns a copy of the cached lookup, promoting it to most recently used.
    #[must_use]
    pub fn try_get(&self, sid: &str) -> Option<AccountLookup> {
        let hit = self.entries.lock().get(sid).cloned();
        if hit.is_some() {
            log::trace!("sid cache hit for {sid}");
        }
        hit
    }

    /// Inserts or replaces an entry, evicting the least recently used one when full.
    pub fn set<S: Into<String>>(&self, sid: S, value: AccountLookup) {
        let sid = sid.into();
        // push hands back the old entry on replacement too
        let evicted = self
            .entries
            .lock()
            .push(sid.clone(), value)
            .filter(|(key, _)| *key != sid);
        if let Some((key, _)) = evicted {
            log::trace!("sid cache evicted {key}");
        }
    }

    /// Drops every entry.
    #[inline]
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// `true` when empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.lock().cap()
    }
}

impl Default for SidCache {
    #[inline]
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
