//! Stateful accessor over `InfoService` for presentation code.
//!
//! Mounting yields a renderable state immediately: valid cached data if
//! there is any, the bundled default otherwise. In the second case a
//! background fetch is spawned and the state updates once it resolves.
//! Subscribers observe changes through a `tokio::sync::watch` channel.
//!
//! Every fetch takes a generation ticket when it starts. Only the newest
//! fetch may publish, so a slow mount fetch can't clear the loading flag of
//! a later `refetch` or overwrite its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{ApiClient, InfoSource};
use crate::models::ProfileSnapshot;
use crate::service::{DataResult, DataSource, InfoService};

#[derive(Debug, Clone)]
pub struct AccessorState {
    pub data: Arc<ProfileSnapshot>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_connected: bool,
    pub source: DataSource,
}

impl AccessorState {
    fn cached(data: Arc<ProfileSnapshot>) -> Self {
        Self {
            data,
            is_loading: false,
            error: None,
            is_connected: true,
            source: DataSource::Cache,
        }
    }

    fn loading(fallback: Arc<ProfileSnapshot>) -> Self {
        Self {
            data: fallback,
            is_loading: true,
            error: None,
            is_connected: false,
            source: DataSource::Fallback,
        }
    }

    /// Fold a service result into the displayed state.
    ///
    /// A failed fetch never replaces live data with the fallback; only the
    /// connectivity flag and error message change.
    fn apply(&mut self, result: DataResult) {
        self.is_loading = false;
        self.is_connected = result.is_connected;
        self.error = result.error;
        if result.is_connected || !self.source.is_live() {
            self.data = result.data;
            self.source = result.source;
        }
    }
}

/// Sender side shared by the accessor and its background fetch.
struct Publisher {
    tx: watch::Sender<AccessorState>,
    generation: AtomicU64,
}

impl Publisher {
    /// Mark a new fetch as in flight and return its ticket.
    fn begin(&self) -> u64 {
        let mut ticket = 0;
        self.tx.send_if_modified(|state| {
            ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            !std::mem::replace(&mut state.is_loading, true)
        });
        ticket
    }

    fn publish(&self, ticket: u64, result: DataResult) {
        if self.tx.is_closed() {
            debug!("Accessor released before fetch resolved, discarding result");
            return;
        }
        // Checked under the channel's write lock so begin() can't interleave
        self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "Superseded fetch resolved, discarding result");
                return false;
            }
            state.apply(result);
            true
        });
    }
}

pub struct InfoAccessor<S: InfoSource + 'static = ApiClient> {
    service: Arc<InfoService<S>>,
    publisher: Arc<Publisher>,
    rx: watch::Receiver<AccessorState>,
    task: Option<JoinHandle<()>>,
}

impl<S: InfoSource + 'static> InfoAccessor<S> {
    /// Produce the initial state and, if needed, start the background fetch.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(service: Arc<InfoService<S>>) -> Self {
        let initial = match service.peek_cached() {
            Some(data) => AccessorState::cached(data),
            None => AccessorState::loading(service.fallback()),
        };
        let needs_fetch = initial.is_loading;

        let (tx, rx) = watch::channel(initial);
        let publisher = Arc::new(Publisher {
            tx,
            generation: AtomicU64::new(0),
        });

        let task = needs_fetch.then(|| {
            let service = service.clone();
            let publisher = publisher.clone();
            let ticket = publisher.begin();
            tokio::spawn(async move {
                let result = service.get_data().await;
                publisher.publish(ticket, result);
            })
        });

        Self {
            service,
            publisher,
            rx,
            task,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> AccessorState {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AccessorState> {
        self.publisher.tx.subscribe()
    }

    /// Wait for any pending fetch to resolve and return the settled state.
    pub async fn settled(&self) -> AccessorState {
        let mut rx = self.rx.clone();
        let settled = rx.wait_for(|state| !state.is_loading).await.map(|state| state.clone());
        match settled {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }

    /// Force a network attempt, like `InfoService::refresh_data`.
    ///
    /// Supersedes any fetch still in flight; its result is dropped.
    pub async fn refetch(&self) -> AccessorState {
        let ticket = self.publisher.begin();
        let result = self.service.refresh_data().await;
        self.publisher.publish(ticket, result);
        self.state()
    }
}

impl<S: InfoSource + 'static> Drop for InfoAccessor<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::oneshot;

    use super::*;
    use crate::api::ApiError;
    use crate::cache::CacheManager;
    use crate::defaults;
    use crate::service::tests::{snapshot_named, ScriptedSource};

    type Reply = Result<ProfileSnapshot, ApiError>;

    /// Source whose calls stay pending until the test releases them.
    #[derive(Default)]
    struct GatedSource {
        gates: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
        calls: AtomicUsize,
    }

    impl GatedSource {
        fn with_gates(count: usize) -> (Self, Vec<oneshot::Sender<Reply>>) {
            let source = Self::default();
            let mut senders = Vec::new();
            for _ in 0..count {
                let (tx, rx) = oneshot::channel();
                source.gates.lock().push_back(rx);
                senders.push(tx);
            }
            (source, senders)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InfoSource for GatedSource {
        async fn fetch_info(&self) -> Result<ProfileSnapshot, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().pop_front();
            match gate {
                Some(gate) => gate
                    .await
                    .unwrap_or_else(|_| Err(ApiError::InvalidResponse("gate dropped".into()))),
                None => Err(ApiError::InvalidResponse("no gate".into())),
            }
        }
    }

    async fn wait_for_calls(service: &InfoService<GatedSource>, n: usize) {
        while service.source().calls() < n {
            tokio::task::yield_now().await;
        }
    }

    async fn settle_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    /// Mount fetch and a refetch both in flight.
    async fn overlapping_fetches() -> (
        Arc<InfoService<GatedSource>>,
        Arc<InfoAccessor<GatedSource>>,
        JoinHandle<AccessorState>,
        oneshot::Sender<Reply>,
        oneshot::Sender<Reply>,
    ) {
        let (source, mut gates) = GatedSource::with_gates(2);
        let service = Arc::new(InfoService::new(
            source,
            CacheManager::in_memory(),
            defaults::bundled(),
        ));
        let accessor = Arc::new(InfoAccessor::mount(service.clone()));
        wait_for_calls(&service, 1).await;

        let refetching = accessor.clone();
        let refetch = tokio::spawn(async move { refetching.refetch().await });
        wait_for_calls(&service, 2).await;

        let refetch_gate = gates.remove(1);
        let mount_gate = gates.remove(0);
        (service, accessor, refetch, mount_gate, refetch_gate)
    }

    fn service(source: ScriptedSource) -> Arc<InfoService<ScriptedSource>> {
        Arc::new(InfoService::new(
            source,
            CacheManager::in_memory(),
            defaults::bundled(),
        ))
    }

    #[tokio::test]
    async fn test_mount_without_cache_starts_loading_with_default() {
        let accessor = InfoAccessor::mount(service(ScriptedSource::new().ok(snapshot_named("Live"))));

        let initial = accessor.state();
        assert!(initial.is_loading);
        assert!(!initial.is_connected);
        assert_eq!(initial.data.owner.display_name, "Janvi Dreamer");

        let settled = accessor.settled().await;
        assert!(!settled.is_loading);
        assert!(settled.is_connected);
        assert_eq!(settled.source, DataSource::Api);
        assert_eq!(settled.data.owner.display_name, "Live");
    }

    #[tokio::test]
    async fn test_mount_with_valid_cache_is_immediately_settled() {
        let service = service(ScriptedSource::new());
        service.cache().save_info(&snapshot_named("Cached")).unwrap();

        let accessor = InfoAccessor::mount(service.clone());
        let state = accessor.state();
        assert!(!state.is_loading);
        assert!(state.is_connected);
        assert_eq!(state.data.owner.display_name, "Cached");
        assert_eq!(service.source().calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_default_and_reports() {
        let accessor = InfoAccessor::mount(service(ScriptedSource::new().err(ApiError::Timeout)));

        let settled = accessor.settled().await;
        assert!(!settled.is_connected);
        assert!(settled.error.is_some());
        assert_eq!(settled.data.owner.display_name, "Janvi Dreamer");
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_live_data() {
        let accessor = InfoAccessor::mount(service(
            ScriptedSource::new()
                .ok(snapshot_named("Live"))
                .err(ApiError::Timeout),
        ));
        accessor.settled().await;

        let after = accessor.refetch().await;
        assert!(!after.is_loading);
        assert!(!after.is_connected);
        assert!(after.error.is_some());
        assert_eq!(after.source, DataSource::Api);
        assert_eq!(after.data.owner.display_name, "Live");
    }

    #[tokio::test]
    async fn test_refetch_updates_subscribers() {
        let service = service(ScriptedSource::new().ok(snapshot_named("Fresh")));
        service.cache().save_info(&snapshot_named("Cached")).unwrap();
        let accessor = InfoAccessor::mount(service.clone());
        let mut rx = accessor.subscribe();

        accessor.refetch().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().data.owner.display_name, "Fresh");
        assert_eq!(service.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_dropping_accessor_discards_pending_fetch() {
        let service = service(ScriptedSource::new().ok(snapshot_named("Live")));
        let accessor = InfoAccessor::mount(service.clone());
        let mut rx = accessor.subscribe();
        drop(accessor);

        // The aborted task never publishes
        tokio::task::yield_now().await;
        assert!(rx.borrow_and_update().is_loading);
    }

    #[tokio::test]
    async fn test_mount_fetch_resolving_first_does_not_end_refetch() {
        let (_service, accessor, refetch, mount_gate, refetch_gate) = overlapping_fetches().await;

        mount_gate.send(Ok(snapshot_named("Mount"))).unwrap();
        settle_tasks().await;
        let state = accessor.state();
        assert!(state.is_loading);
        assert_eq!(state.data.owner.display_name, "Janvi Dreamer");

        refetch_gate.send(Ok(snapshot_named("Refetch"))).unwrap();
        let after = refetch.await.unwrap();
        assert!(!after.is_loading);
        assert_eq!(after.data.owner.display_name, "Refetch");
    }

    #[tokio::test]
    async fn test_late_mount_result_does_not_overwrite_refetch() {
        let (_service, accessor, refetch, mount_gate, refetch_gate) = overlapping_fetches().await;

        refetch_gate.send(Ok(snapshot_named("Refetch"))).unwrap();
        let after = refetch.await.unwrap();
        assert_eq!(after.data.owner.display_name, "Refetch");

        mount_gate.send(Ok(snapshot_named("Mount"))).unwrap();
        settle_tasks().await;
        let state = accessor.state();
        assert!(!state.is_loading);
        assert_eq!(state.source, DataSource::Api);
        assert_eq!(state.data.owner.display_name, "Refetch");
    }

    #[test]
    fn test_apply_takes_result_over_fallback() {
        let mut state = AccessorState::loading(defaults::bundled());
        let stale = DataResult {
            data: Arc::new(snapshot_named("Stale")),
            is_loading: false,
            error: Some("Backend unavailable".into()),
            is_connected: false,
            source: DataSource::Stale,
        };
        state.apply(stale);
        assert_eq!(state.source, DataSource::Stale);
        assert_eq!(state.data.owner.display_name, "Stale");
    }
}
