//! Session-scoped cache of hosted diagram URLs.
//!
//! Re-running a conversion over a document with unchanged diagrams should
//! not re-upload them. Keys hash the diagram kind together with its source,
//! so the same source text as flowchart and as ASCII art caches separately.

use std::collections::HashMap;
use std::sync::RwLock;

use mdpaste_transform::DiagramKind;
use sha2::{Digest, Sha256};

/// Identity of a diagram for cache lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey<'a> {
    pub kind: DiagramKind,
    pub source: &'a str,
}

impl CacheKey<'_> {
    /// Compute the hash string used as the cache key.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}", self.kind.as_str(), self.source));
        hex::encode(hasher.finalize())
    }
}

/// In-memory map from diagram hash to hosted URL.
///
/// Insertion is first-writer-wins: once a hash has a URL, later inserts for
/// the same hash return the stored URL unchanged.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: RwLock<HashMap<String, String>>,
}

impl SessionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the hosted URL for a key.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.read().unwrap().get(&key.compute_hash()).cloned()
    }

    /// Store a URL for a key, returning the URL that is now cached.
    ///
    /// If the key is already present the existing URL wins and is returned.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    pub fn insert(&self, key: &CacheKey, url: String) -> String {
        self.entries
            .write()
            .unwrap()
            .entry(key.compute_hash())
            .or_insert(url)
            .clone()
    }

    /// Number of cached entries.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the cache is empty.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}
