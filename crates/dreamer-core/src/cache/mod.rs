//! Local caching of the info document.
//!
//! `CacheManager` stores the last successful `/api/info` response as
//! `{ data, timestamp }` JSON and treats it as expired after 5 minutes.
//! Entries live either in a cache directory (`FileStore`) or in process
//! memory (`MemoryStore`).

pub mod manager;
pub mod store;

pub use manager::{CacheManager, CachedData, DEFAULT_TTL_SECS, INFO_CACHE_KEY};
pub use store::{CacheStore, FileStore, MemoryStore};
