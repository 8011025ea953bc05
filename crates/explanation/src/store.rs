//! Explanation store
//!
//! Recent trails keyed by inference id, bounded by LRU capacity and expired
//! after a fixed time to live.

use crate::{ExplanationError, ExplanationTrail};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum retained trails; least recently used are evicted first
    pub capacity: usize,
    /// Seconds a trail stays retrievable
    pub ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000,
            ttl_secs: 3_600,
        }
    }
}

struct Entry {
    trail: Arc<ExplanationTrail>,
    inserted: Instant,
}

/// Shared, bounded trail store
pub struct ExplanationStore {
    entries: Mutex<LruCache<Uuid, Entry>>,
    ttl: Duration,
}

impl ExplanationStore {
    pub fn new(config: StoreConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        info!(
            "Creating explanation store (capacity {}, ttl {}s)",
            capacity, config.ttl_secs
        );
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<Uuid, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Retain a finished trail
    pub fn insert(&self, trail: ExplanationTrail) -> Arc<ExplanationTrail> {
        let id = trail.inference_id;
        let trail = Arc::new(trail);
        let entry = Entry {
            trail: Arc::clone(&trail),
            inserted: Instant::now(),
        };

        if let Some((evicted, _)) = self.lock().push(id, entry) {
            if evicted != id {
                debug!("Evicted explanation {}", evicted);
            }
        }
        trail
    }

    /// Look up a trail; expired entries are dropped on access
    pub fn get(&self, id: &Uuid) -> Option<Arc<ExplanationTrail>> {
        let mut entries = self.lock();
        let expired = entries.peek(id)?.inserted.elapsed() >= self.ttl;
        if expired {
            entries.pop(id);
            debug!("Explanation {} expired", id);
            return None;
        }
        entries.get(id).map(|entry| Arc::clone(&entry.trail))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the detailed log of a trail to `<dir>/<id>.log`
    pub fn export(&self, id: &Uuid, dir: &Path) -> Result<PathBuf, ExplanationError> {
        let trail = self.get(id).ok_or(ExplanationError::NotFound(*id))?;

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", id));
        std::fs::write(&path, trail.detailed_log())?;

        info!("Exported explanation {} to {}", id, path.display());
        Ok(path)
    }
}

impl Default for ExplanationStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
