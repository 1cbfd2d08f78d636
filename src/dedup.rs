//! dedup.rs: set of already-notified article ids, persisted as a JSON array.
//!
//! Loaded once at startup, mutated in memory, and overwritten on `flush()`.
//! A single async mutex guards both the set and the file write, so concurrent
//! monitors never lose an update and never write an older snapshot over a newer one.
//! Entries are never evicted.

use anyhow::{Context, Result};
use metrics::gauge;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

#[derive(Debug)]
pub struct DedupCache {
    path: Option<PathBuf>,
    inner: Mutex<HashSet<String>>,
}

impl DedupCache {
    /// In-memory only; `flush` is a no-op. Used by dry runs and tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Mutex::new(HashSet::new()),
        }
    }

    /// Load from `path`. Missing file → empty set. Malformed file → empty set + warning
    /// (the next flush overwrites it).
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let set = match fs::read_to_string(&path).await {
            Ok(s) => match serde_json::from_str::<Vec<String>>(&s) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(target: "dedup", path = %path.display(), error = %e, "dedup file malformed, starting empty");
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                tracing::warn!(target: "dedup", path = %path.display(), error = %e, "dedup file unreadable, starting empty");
                HashSet::new()
            }
        };
        tracing::info!(target: "dedup", path = %path.display(), entries = set.len(), "dedup cache loaded");
        gauge!("sentinel_dedup_entries").set(set.len() as f64);
        Self {
            path: Some(path),
            inner: Mutex::new(set),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.lock().await.contains(id)
    }

    /// Returns true if `id` was not present before.
    pub async fn add(&self, id: &str) -> bool {
        let mut g = self.inner.lock().await;
        let fresh = g.insert(id.to_string());
        gauge!("sentinel_dedup_entries").set(g.len() as f64);
        fresh
    }

    /// Check-and-insert under one lock. Only the first caller for an id gets `true`,
    /// which makes it the only one allowed to notify that article.
    pub async fn claim(&self, id: &str) -> bool {
        self.add(id).await
    }

    /// Undo a claim for an article that was never sent. Returns true if it was present.
    pub async fn release(&self, id: &str) -> bool {
        let mut g = self.inner.lock().await;
        let removed = g.remove(id);
        gauge!("sentinel_dedup_entries").set(g.len() as f64);
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Sorted snapshot of all ids.
    pub async fn snapshot(&self) -> Vec<String> {
        let g = self.inner.lock().await;
        g.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// Overwrite the backing file with the current set (sorted, for stable diffs).
    /// Written to a sibling temp file first, then renamed over the target.
    pub async fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        // lock held across the write: flushes are serialized with mutations
        let g = self.inner.lock().await;
        let sorted: BTreeSet<&String> = g.iter().collect();
        let body = serde_json::to_vec_pretty(&sorted).context("serialize dedup set")?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create dedup dir {}", dir.display()))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;

        tracing::debug!(target: "dedup", entries = g.len(), "dedup cache flushed");
        Ok(())
    }
}
