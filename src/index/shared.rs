//! Shared Tag Index
//!
//! Concurrency wrapper around [`TagIndex`]: one writer or many readers per
//! operation, plus rebuild-and-swap so a full rescan never blocks queries for
//! longer than a pointer exchange.

use crate::index::{IndexStats, TagIndex, TaggedSeries};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Cloneable handle to a lock-protected [`TagIndex`]
#[derive(Debug, Clone, Default)]
pub struct SharedTagIndex {
    inner: Arc<RwLock<TagIndex>>,
}

impl SharedTagIndex {
    /// Create a handle around an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing index
    pub fn from_index(index: TagIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Run a read-only operation under the shared lock
    pub fn read<R>(&self, f: impl FnOnce(&TagIndex) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run a mutating operation under the exclusive lock
    pub fn write<R>(&self, f: impl FnOnce(&mut TagIndex) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Insert a single `(path, tag, value, metric)` fact
    pub fn insert(&self, path: &str, tag: &str, value: &str, metric: &str) {
        self.inner.write().insert(path, tag, value, metric);
    }

    /// Insert all tag pairs of a parsed series path
    pub fn insert_series(&self, series: &TaggedSeries<'_>) -> bool {
        self.inner.write().insert_series(series)
    }

    /// Replace the current index with `index`, returning the old one
    pub fn swap(&self, index: TagIndex) -> TagIndex {
        std::mem::replace(&mut *self.inner.write(), index)
    }

    /// Rebuild the index from a full list of series paths
    ///
    /// The new index is built without holding the lock; readers keep seeing
    /// the previous snapshot until the swap.
    pub fn rebuild<'a, I>(&self, paths: I) -> IndexStats
    where
        I: IntoIterator<Item = &'a str>,
    {
        let started = Instant::now();
        let fresh = TagIndex::from_series(paths);
        let stats = fresh.stats();
        self.swap(fresh);

        tracing::info!(
            tags = stats.tags,
            paths = stats.paths,
            runtime_ms = started.elapsed().as_millis() as u64,
            "Tag index rebuilt"
        );
        stats
    }

    /// Rebuild from a file of series paths, one per line
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn rebuild_from_file(&self, path: &Path) -> std::io::Result<IndexStats> {
        let content = std::fs::read_to_string(path)?;
        let paths = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));

        tracing::info!(file = %path.display(), "Loading series paths");
        Ok(self.rebuild(paths))
    }

    /// Size counters of the current index
    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }
}
