//! In-memory caching using moka
//!
//! Caches filtered listing selections keyed by the canonical query
//! string. The catalog is immutable, so entries never go stale; TTLs
//! only bound memory for long-tail query combinations. Favorites-first
//! ordering is applied after retrieval and is never cached.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Hotel;

/// Application cache holding listing selections
#[derive(Clone)]
pub struct AppCache {
    /// Filtered/sorted listings (canonical query key -> hotels)
    pub listings: Cache<String, Arc<Vec<Hotel>>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Listings: 200 query combinations, 30 min TTL, 10 min idle
            listings: Cache::builder()
                .max_capacity(200)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            listings_size: self.listings.entry_count(),
        }
    }

    pub fn invalidate_all(&self) {
        self.listings.invalidate_all();
        tracing::info!("All caches invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub listings_size: u64,
}
