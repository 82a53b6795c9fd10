//! The cache-then-network-then-fallback data service.
//!
//! `InfoService` always hands back something renderable. Backend and cache
//! failures are logged, reduced to an error string, and replaced by the
//! fallback profile; they never reach the caller as `Err`.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, InfoSource};
use crate::cache::{CacheManager, CachedData};
use crate::config::{Config, StalePolicy};
use crate::defaults;
use crate::models::ProfileSnapshot;

const REMOTE_DISABLED_MESSAGE: &str = "Remote API disabled";

/// Where the data in a `DataResult` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// An unexpired cache entry
    Cache,
    /// A fetch that just succeeded
    Api,
    /// An expired cache entry served because the refetch failed
    Stale,
    /// The bundled fallback profile
    Fallback,
}

impl DataSource {
    /// True for data that came from the backend at some point.
    pub fn is_live(&self) -> bool {
        !matches!(self, DataSource::Fallback)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Cache => "cache",
            DataSource::Api => "api",
            DataSource::Stale => "stale",
            DataSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataResult {
    pub data: Arc<ProfileSnapshot>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_connected: bool,
    pub source: DataSource,
}

impl DataResult {
    fn connected(data: Arc<ProfileSnapshot>, source: DataSource) -> Self {
        Self {
            data,
            is_loading: false,
            error: None,
            is_connected: true,
            source,
        }
    }

    fn disconnected(data: Arc<ProfileSnapshot>, source: DataSource, error: String) -> Self {
        Self {
            data,
            is_loading: false,
            error: Some(error),
            is_connected: false,
            source,
        }
    }
}

enum CacheLookup {
    Fresh(CachedData<ProfileSnapshot>),
    Expired(CachedData<ProfileSnapshot>),
    Missing,
}

pub struct InfoService<S = ApiClient> {
    source: S,
    cache: CacheManager,
    fallback: Arc<ProfileSnapshot>,
    use_remote_api: bool,
    stale_policy: StalePolicy,
}

impl InfoService<ApiClient> {
    /// Build the service the CLI runs with: HTTP source, configured cache,
    /// configured fallback.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = ApiClient::new(&config.backend_url, config.request_timeout())?;
        let cache = if config.persistent_cache {
            CacheManager::persistent(config.cache_dir()?)?
        } else {
            CacheManager::in_memory()
        };
        let fallback = defaults::load_fallback(config.fallback_path.as_deref());

        Ok(Self::new(source, cache.with_ttl(config.cache_ttl()), fallback)
            .with_remote_api(config.use_remote_api)
            .with_stale_policy(config.stale_policy))
    }
}

impl<S: InfoSource> InfoService<S> {
    pub fn new(source: S, cache: CacheManager, fallback: Arc<ProfileSnapshot>) -> Self {
        Self {
            source,
            cache,
            fallback,
            use_remote_api: true,
            stale_policy: StalePolicy::default(),
        }
    }

    pub fn with_remote_api(mut self, enabled: bool) -> Self {
        self.use_remote_api = enabled;
        self
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    pub fn fallback(&self) -> Arc<ProfileSnapshot> {
        self.fallback.clone()
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return cached data if valid, otherwise fetch, otherwise fall back.
    pub async fn get_data(&self) -> DataResult {
        if !self.use_remote_api {
            return self.remote_disabled();
        }

        match self.lookup_cache() {
            CacheLookup::Fresh(entry) => {
                debug!("Serving info from cache");
                DataResult::connected(Arc::new(entry.data), DataSource::Cache)
            }
            CacheLookup::Expired(entry) => self.fetch_and_store(Some(entry)).await,
            CacheLookup::Missing => self.fetch_and_store(None).await,
        }
    }

    /// Drop any cache entry and always go to the network.
    pub async fn refresh_data(&self) -> DataResult {
        if !self.use_remote_api {
            return self.remote_disabled();
        }

        // Keep the old entry in hand so the lenient policy can still serve it
        let stale = match self.stale_policy {
            StalePolicy::ServeStaleOnFailure => self.cache.load_info().ok().flatten(),
            StalePolicy::Discard => None,
        };
        self.clear_cache();
        self.fetch_and_store(stale).await
    }

    pub fn clear_cache(&self) {
        if let Err(e) = self.cache.clear_info() {
            warn!(error = %e, "Failed to clear info cache");
        }
    }

    /// Valid cached data, without touching the network.
    pub fn peek_cached(&self) -> Option<Arc<ProfileSnapshot>> {
        if !self.use_remote_api {
            return None;
        }
        match self.lookup_cache() {
            CacheLookup::Fresh(entry) => Some(Arc::new(entry.data)),
            CacheLookup::Expired(_) | CacheLookup::Missing => None,
        }
    }

    pub fn cache_age(&self) -> Option<String> {
        self.cache.info_age()
    }

    fn lookup_cache(&self) -> CacheLookup {
        let entry = match self.cache.load_info() {
            Ok(Some(entry)) => entry,
            Ok(None) => return CacheLookup::Missing,
            Err(e) => {
                warn!(error = %e, "Unreadable info cache, discarding");
                self.clear_cache();
                return CacheLookup::Missing;
            }
        };

        if !self.cache.is_expired(&entry) {
            return CacheLookup::Fresh(entry);
        }

        match self.stale_policy {
            StalePolicy::ServeStaleOnFailure => CacheLookup::Expired(entry),
            StalePolicy::Discard => {
                debug!(age = %entry.age_display(), "Info cache expired, discarding");
                self.clear_cache();
                CacheLookup::Missing
            }
        }
    }

    async fn fetch_and_store(&self, stale: Option<CachedData<ProfileSnapshot>>) -> DataResult {
        match self.source.fetch_info().await {
            Ok(snapshot) => {
                if let Err(e) = self.cache.save_info(&snapshot) {
                    warn!(error = %e, "Failed to cache info data");
                }
                info!("Fetched fresh info from backend");
                DataResult::connected(Arc::new(snapshot), DataSource::Api)
            }
            Err(e) => {
                let error = format!("Backend unavailable: {}", e);
                match stale {
                    Some(entry) => {
                        warn!(error = %e, age = %entry.age_display(), "Backend unavailable, serving stale cache");
                        // Put it back in case a refresh cleared it
                        if let Err(e) = self.cache.save_info_entry(&entry) {
                            debug!(error = %e, "Failed to restore stale cache entry");
                        }
                        DataResult::disconnected(Arc::new(entry.data), DataSource::Stale, error)
                    }
                    None => {
                        warn!(error = %e, "Backend unavailable, using fallback data");
                        DataResult::disconnected(self.fallback(), DataSource::Fallback, error)
                    }
                }
            }
        }
    }

    fn remote_disabled(&self) -> DataResult {
        debug!("Remote API disabled, using fallback data only");
        DataResult::disconnected(
            self.fallback(),
            DataSource::Fallback,
            REMOTE_DISABLED_MESSAGE.to_string(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use parking_lot::Mutex;

    use super::*;
    use crate::api::ApiError;
    use crate::models::PresenceStatus;

    /// Source that replays scripted responses and counts calls.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        responses: Mutex<VecDeque<Result<ProfileSnapshot, ApiError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn ok(self, snapshot: ProfileSnapshot) -> Self {
            self.responses.lock().push_back(Ok(snapshot));
            self
        }

        pub(crate) fn err(self, error: ApiError) -> Self {
            self.responses.lock().push_back(Err(error));
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InfoSource for ScriptedSource {
        async fn fetch_info(&self) -> Result<ProfileSnapshot, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Suspend like a real request would
            tokio::task::yield_now().await;
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::InvalidResponse("no scripted response".into())))
        }
    }

    pub(crate) fn snapshot_named(name: &str) -> ProfileSnapshot {
        let mut snapshot = ProfileSnapshot::default();
        snapshot.owner.display_name = name.to_string();
        snapshot
    }

    fn service(source: ScriptedSource) -> InfoService<ScriptedSource> {
        InfoService::new(source, CacheManager::in_memory(), defaults::bundled())
    }

    fn expire_cache(service: &InfoService<ScriptedSource>) {
        let mut entry = service.cache().load_info().unwrap().unwrap();
        entry.cached_at = Utc::now() - Duration::minutes(6);
        service.cache().save_info_entry(&entry).unwrap();
    }

    #[tokio::test]
    async fn test_success_is_cached() {
        let service = service(ScriptedSource::new().ok(snapshot_named("Live")));

        let first = service.get_data().await;
        assert_eq!(first.source, DataSource::Api);
        assert!(first.is_connected);
        assert!(first.error.is_none());
        assert!(!first.is_loading);
        assert_eq!(first.data.owner.display_name, "Live");

        let second = service.get_data().await;
        assert_eq!(second.source, DataSource::Cache);
        assert!(second.is_connected);
        assert_eq!(second.data, first.data);
        assert_eq!(service.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_repeated_calls_fetch_once() {
        let service = service(ScriptedSource::new().ok(snapshot_named("Live")));
        for _ in 0..5 {
            assert!(service.get_data().await.is_connected);
        }
        assert_eq!(service.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_valid_cache_skips_network() {
        let service = service(ScriptedSource::new());
        service.cache().save_info(&snapshot_named("Cached")).unwrap();

        let result = service.get_data().await;
        assert_eq!(result.source, DataSource::Cache);
        assert_eq!(result.data.owner.display_name, "Cached");
        assert!(result.is_connected);
        assert_eq!(service.source().calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_bundled_default() {
        let service = service(ScriptedSource::new().err(ApiError::Timeout));

        let result = service.get_data().await;
        assert_eq!(result.source, DataSource::Fallback);
        assert!(!result.is_connected);
        assert_eq!(result.data.owner.display_name, "Janvi Dreamer");
        let error = result.error.unwrap();
        assert!(error.starts_with("Backend unavailable"), "{error}");
        assert!(service.cache().load_info().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_cache_is_discarded_by_default() {
        let service = service(
            ScriptedSource::new()
                .ok(snapshot_named("Old"))
                .err(ApiError::RateLimited),
        );
        service.get_data().await;
        expire_cache(&service);

        let result = service.get_data().await;
        assert_eq!(service.source().calls(), 2);
        assert_eq!(result.source, DataSource::Fallback);
        assert_eq!(result.data.owner.display_name, "Janvi Dreamer");
        assert!(service.cache().load_info().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_cache_refetches_on_success() {
        let service = service(
            ScriptedSource::new()
                .ok(snapshot_named("Old"))
                .ok(snapshot_named("New")),
        );
        service.get_data().await;
        expire_cache(&service);

        let result = service.get_data().await;
        assert_eq!(result.source, DataSource::Api);
        assert_eq!(result.data.owner.display_name, "New");
    }

    #[tokio::test]
    async fn test_serve_stale_on_failure() {
        let service = service(
            ScriptedSource::new()
                .ok(snapshot_named("Old"))
                .err(ApiError::Timeout),
        )
        .with_stale_policy(StalePolicy::ServeStaleOnFailure);
        service.get_data().await;
        expire_cache(&service);

        let result = service.get_data().await;
        assert_eq!(result.source, DataSource::Stale);
        assert!(!result.is_connected);
        assert!(result.error.is_some());
        assert_eq!(result.data.owner.display_name, "Old");
        // Never promoted to a fresh hit
        assert!(service.peek_cached().is_none());
    }

    #[tokio::test]
    async fn test_refresh_always_hits_network() {
        let service = service(
            ScriptedSource::new()
                .ok(snapshot_named("First"))
                .ok(snapshot_named("Second")),
        );
        assert_eq!(service.get_data().await.source, DataSource::Api);
        assert_eq!(service.get_data().await.source, DataSource::Cache);

        let refreshed = service.refresh_data().await;
        assert_eq!(refreshed.source, DataSource::Api);
        assert_eq!(refreshed.data.owner.display_name, "Second");
        assert_eq!(service.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_discards_cache() {
        let service = service(
            ScriptedSource::new()
                .ok(snapshot_named("First"))
                .err(ApiError::Timeout),
        );
        service.get_data().await;

        let refreshed = service.refresh_data().await;
        assert_eq!(refreshed.source, DataSource::Fallback);
        assert!(service.peek_cached().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_under_lenient_policy() {
        let service = service(
            ScriptedSource::new()
                .ok(snapshot_named("First"))
                .err(ApiError::Timeout),
        )
        .with_stale_policy(StalePolicy::ServeStaleOnFailure);
        service.get_data().await;

        let refreshed = service.refresh_data().await;
        assert_eq!(refreshed.source, DataSource::Stale);
        assert_eq!(refreshed.data.owner.display_name, "First");
        assert!(service.cache().load_info().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_cache_forces_network() {
        let service = service(
            ScriptedSource::new()
                .ok(snapshot_named("First"))
                .ok(snapshot_named("Second")),
        );
        service.get_data().await;
        service.clear_cache();
        service.clear_cache();

        let result = service.get_data().await;
        assert_eq!(result.source, DataSource::Api);
        assert_eq!(service.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_remote_disabled_never_fetches() {
        let service = service(ScriptedSource::new().ok(snapshot_named("Live")))
            .with_remote_api(false);

        let result = service.get_data().await;
        assert_eq!(result.source, DataSource::Fallback);
        assert_eq!(result.error.as_deref(), Some(REMOTE_DISABLED_MESSAGE));
        assert!(!service.refresh_data().await.is_connected);
        assert_eq!(service.source().calls(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_treated_as_miss() {
        use crate::cache::{CacheStore, MemoryStore, INFO_CACHE_KEY};

        let store = MemoryStore::new();
        store.write(INFO_CACHE_KEY, "garbage").unwrap();
        let service = InfoService::new(
            ScriptedSource::new().ok(snapshot_named("Live")),
            CacheManager::new(Box::new(store)),
            defaults::bundled(),
        );

        let result = service.get_data().await;
        assert_eq!(result.source, DataSource::Api);
        assert_eq!(service.cache().load_info().unwrap().unwrap().data.owner.display_name, "Live");
    }

    #[tokio::test]
    async fn test_status_scenario() {
        let body = r#"{ "guild": { "memberCountFormatted": "1.2K" }, "owner": { "status": "online" } }"#;
        let service = service(ScriptedSource::new().ok(ProfileSnapshot::from_json(body).unwrap()));

        let result = service.get_data().await;
        assert_eq!(result.data.guild.member_count_formatted.display(), "1.2K");
        assert_eq!(result.data.owner.status, PresenceStatus::Online);
        let badge = result.data.owner.status.badge().unwrap();
        assert_eq!(badge.label, "Online");
    }

    #[tokio::test]
    async fn test_concurrent_calls_fetch_independently() {
        let service = service(
            ScriptedSource::new()
                .ok(snapshot_named("A"))
                .ok(snapshot_named("B")),
        );

        let (a, b) = futures::future::join(service.get_data(), service.get_data()).await;
        assert!(a.is_connected && b.is_connected);
        assert_eq!(service.source().calls(), 2);
    }
}
