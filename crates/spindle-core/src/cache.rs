//! Explicit artifact cache
//!
//! Derived artifacts (spindle groups, count matrices) are keyed by subject,
//! reference scheme and parameter set. Each entry also stores the
//! [`Fingerprint`] of the recording it was computed from; a lookup with a
//! different fingerprint (the channel count changed, or the detector was run
//! with other smoothing parameters) evicts the stale entry and reports a miss.
//!
//! # Thread Safety
//!
//! Storage sits behind a single `Mutex`; values are handed out as `Arc<V>` so
//! callers never hold the lock while using an artifact. Two threads missing on
//! the same key may both compute it; the second insert wins. Artifacts are
//! pure functions of their key, so this only costs time.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::types::Reref;
use crate::{Error, Result};

/// Cache eviction policy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachePolicy {
    /// No caching
    NoCache,
    /// Least recently used eviction
    Lru { max_entries: usize },
    /// Unbounded - never evict, only add
    Unbounded,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Lru { max_entries: 256 }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of entries currently in cache
    pub entries: usize,
    /// Entries dropped because their fingerprint no longer matched
    pub invalidations: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

/// Identity of a derived artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub subject: String,
    pub reref: Reref,
    /// Canonical description of the analysis parameters
    pub params: String,
}

impl CacheKey {
    pub fn new(subject: impl Into<String>, reref: Reref, params: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            reref,
            params: params.into(),
        }
    }
}

/// Properties of the recording an artifact was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub n_channels: usize,
    /// Detector envelope smoothing width (s)
    pub smoothing_std: f64,
    /// Detector envelope threshold (in standard deviations)
    pub smoothing_threshold: f64,
}

impl Fingerprint {
    pub fn new(n_channels: usize, smoothing_std: f64, smoothing_threshold: f64) -> Self {
        Self {
            n_channels,
            smoothing_std,
            smoothing_threshold,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    fingerprint: Fingerprint,
    value: Arc<V>,
    last_access: u64,
}

#[derive(Serialize, Deserialize)]
struct StoredEntry<V> {
    key: CacheKey,
    fingerprint: Fingerprint,
    value: V,
}

/// Key → artifact cache with fingerprint invalidation
///
/// # Example
///
/// ```rust
/// use spindle_core::{ArtifactCache, CacheKey, CachePolicy, Fingerprint, Reref};
///
/// let cache: ArtifactCache<Vec<usize>> = ArtifactCache::new(CachePolicy::Unbounded);
/// let key = CacheKey::new("sub-01", Reref::Average, "groups");
/// let fp = Fingerprint::new(64, 0.04, 3.0);
///
/// let value = cache
///     .get_or_try_insert_with(&key, fp, || Ok::<_, spindle_core::Error>(vec![1, 2, 3]))
///     .unwrap();
/// assert_eq!(*value, vec![1, 2, 3]);
/// assert_eq!(cache.stats().misses, 1);
///
/// // Same recording: hit
/// assert!(cache.get(&key, fp).is_some());
/// // Channel count changed: the entry is stale
/// assert!(cache.get(&key, Fingerprint::new(63, 0.04, 3.0)).is_none());
/// ```
pub struct ArtifactCache<V> {
    storage: Mutex<HashMap<CacheKey, Entry<V>>>,
    policy: CachePolicy,
    hits: AtomicUsize,
    misses: AtomicUsize,
    invalidations: AtomicUsize,
    access_counter: AtomicU64,
}

impl<V> ArtifactCache<V> {
    /// Create a new cache with the specified policy
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            storage: Mutex::new(HashMap::new()),
            policy,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
            access_counter: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<CacheKey, Entry<V>>>> {
        self.storage
            .lock()
            .map_err(|_| Error::Cache("artifact cache lock poisoned".to_string()))
    }

    fn tick(&self) -> u64 {
        self.access_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Look up an artifact computed from a recording with `fingerprint`
    ///
    /// A stored entry with a different fingerprint is evicted and the lookup
    /// counts as a miss.
    pub fn get(&self, key: &CacheKey, fingerprint: Fingerprint) -> Option<Arc<V>> {
        if matches!(self.policy, CachePolicy::NoCache) {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        let now = self.tick();
        let mut storage = match self.lock() {
            Ok(storage) => storage,
            Err(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        let stale = match storage.get_mut(key) {
            Some(entry) if entry.fingerprint == fingerprint => {
                entry.last_access = now;
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry.value));
            }
            Some(_) => true,
            None => false,
        };

        if stale {
            storage.remove(key);
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(subject = %key.subject, reref = %key.reref, params = %key.params, "evicted stale artifact");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store an artifact, applying the eviction policy
    pub fn insert(&self, key: CacheKey, fingerprint: Fingerprint, value: V) -> Result<Arc<V>> {
        let value = Arc::new(value);
        if matches!(self.policy, CachePolicy::NoCache) {
            return Ok(value);
        }
        let now = self.tick();
        let mut storage = self.lock()?;

        if let CachePolicy::Lru { max_entries } = self.policy {
            if max_entries == 0 {
                return Ok(value);
            }
            while storage.len() >= max_entries && !storage.contains_key(&key) {
                let oldest = storage
                    .iter()
                    .min_by_key(|(_, e)| e.last_access)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        storage.remove(&k);
                    }
                    None => break,
                }
            }
        }

        storage.insert(
            key,
            Entry {
                fingerprint,
                value: Arc::clone(&value),
                last_access: now,
            },
        );
        Ok(value)
    }

    /// Return the cached artifact or compute, store and return it
    ///
    /// Errors from `compute` are passed through and nothing is stored.
    pub fn get_or_try_insert_with<F, E>(
        &self,
        key: &CacheKey,
        fingerprint: Fingerprint,
        compute: F,
    ) -> std::result::Result<Arc<V>, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
        E: From<Error>,
    {
        if let Some(value) = self.get(key, fingerprint) {
            return Ok(value);
        }
        let value = compute()?;
        Ok(self.insert(key.clone(), fingerprint, value)?)
    }

    /// Drop every artifact of one subject
    pub fn invalidate_subject(&self, subject: &str) -> Result<usize> {
        let mut storage = self.lock()?;
        let before = storage.len();
        storage.retain(|k, _| k.subject != subject);
        Ok(before - storage.len())
    }

    /// Drop one artifact
    pub fn invalidate(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let entries = self.lock().map(|s| s.len()).unwrap_or(0);

        CacheStats {
            hits,
            misses,
            entries,
            invalidations: self.invalidations.load(Ordering::Relaxed),
            hit_rate: if hits + misses > 0 {
                hits as f64 / (hits + misses) as f64
            } else {
                0.0
            },
        }
    }

    /// Clear all entries and reset statistics
    pub fn clear(&self) {
        if let Ok(mut storage) = self.lock() {
            storage.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
        self.access_counter.store(0, Ordering::Relaxed);
    }
}

impl<V: Serialize> ArtifactCache<V> {
    /// Persist every entry as JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let storage = self.lock()?;
        let mut entries: Vec<StoredEntry<&V>> = storage
            .iter()
            .map(|(key, e)| StoredEntry {
                key: key.clone(),
                fingerprint: e.fingerprint,
                value: e.value.as_ref(),
            })
            .collect();
        entries.sort_by(|a, b| {
            (&a.key.subject, &a.key.params).cmp(&(&b.key.subject, &b.key.params))
        });

        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer(writer, &entries)?;
        debug!(entries = entries.len(), path = %path.as_ref().display(), "saved artifact cache");
        Ok(())
    }
}

impl<V: DeserializeOwned> ArtifactCache<V> {
    /// Load entries previously written by [`ArtifactCache::save_json`]
    ///
    /// Loaded entries are subject to the same fingerprint check as computed
    /// ones.
    pub fn load_json(path: impl AsRef<Path>, policy: CachePolicy) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let entries: Vec<StoredEntry<V>> = serde_json::from_reader(reader)?;
        let cache = Self::new(policy);
        let n = entries.len();
        for entry in entries {
            cache.insert(entry.key, entry.fingerprint, entry.value)?;
        }
        debug!(entries = n, path = %path.as_ref().display(), "loaded artifact cache");
        Ok(cache)
    }
}
