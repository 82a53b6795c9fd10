use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::ProfileSnapshot;

use super::store::{CacheStore, FileStore, MemoryStore};

/// Key the info document is cached under
pub const INFO_CACHE_KEY: &str = "info_data_cache";

/// Consider cached data expired after 5 minutes.
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

/// A cached value with its capture time, stored as `{ data, timestamp }`
/// where `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }

    pub fn age_minutes(&self) -> i64 {
        self.age().num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    /// Expired once the wall clock passes capture time plus `ttl`. A
    /// deadline past the representable range never expires.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at
            .checked_add_signed(ttl)
            .is_some_and(|deadline| Utc::now() > deadline)
    }
}

/// Typed access to the cache store.
pub struct CacheManager {
    store: Box<dyn CacheStore>,
    ttl: Duration,
}

impl CacheManager {
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self {
            store,
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    /// Cache backed by JSON files in `cache_dir`.
    pub fn persistent(cache_dir: PathBuf) -> Result<Self> {
        Ok(Self::new(Box::new(FileStore::new(cache_dir)?)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let Some(contents) = self.store.read(name)? else {
            return Ok(None);
        };

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        self.save_entry(name, &CachedData::new(data))
    }

    fn save_entry<T: Serialize>(&self, name: &str, entry: &CachedData<T>) -> Result<()> {
        let contents = serde_json::to_string(entry)?;
        self.store.write(name, &contents)
    }

    // ===== Info document =====

    pub fn load_info(&self) -> Result<Option<CachedData<ProfileSnapshot>>> {
        self.load(INFO_CACHE_KEY)
    }

    pub fn save_info(&self, snapshot: &ProfileSnapshot) -> Result<()> {
        self.save(INFO_CACHE_KEY, snapshot)
    }

    /// Store an entry with an explicit capture time.
    pub fn save_info_entry(&self, entry: &CachedData<ProfileSnapshot>) -> Result<()> {
        self.save_entry(INFO_CACHE_KEY, entry)
    }

    pub fn clear_info(&self) -> Result<()> {
        self.store.remove(INFO_CACHE_KEY)
    }

    pub fn is_expired<T>(&self, cached: &CachedData<T>) -> bool {
        cached.is_expired(self.ttl)
    }

    /// Age of the stored info entry for display, logging read errors.
    pub fn info_age(&self) -> Option<String> {
        match self.load_info() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = INFO_CACHE_KEY, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
