use crate::types::activity::{Availability, Metrics, ParsedActivity};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// An upload held in memory. Profile requests re-run the pipeline with
/// per-request options, so the parsed points are kept as-is.
#[derive(Clone)]
pub struct StoredActivity {
    pub activity: ParsedActivity,
    pub metrics: Metrics,
    pub availability: Availability,
}

struct CacheEntry {
    stored: StoredActivity,
    inserted_at: Instant,
}

#[derive(Clone)]
pub struct AppState {
    cache: Arc<DashMap<String, CacheEntry>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn insert(&self, file_id: String, stored: StoredActivity) {
        self.cache.insert(
            file_id,
            CacheEntry {
                stored,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, file_id: &str) -> Option<StoredActivity> {
        self.cache.get(file_id).map(|entry| entry.stored.clone())
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.cache
            .retain(|_, entry| now.duration_since(entry.inserted_at) < ttl);
        tracing::info!("Cache eviction complete. Current size: {}", self.cache.len());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
