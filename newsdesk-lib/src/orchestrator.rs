//! The fetch orchestrator

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;
use log::debug;
use log::warn;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::auth::AuthGuard;
use crate::cache::CacheConfig;
use crate::cache::CacheEnvelope;
use crate::cache::CacheKey;
use crate::cache::CacheStore;
use crate::cache::FreshnessWindow;
use crate::cache::InMemoryStore;
use crate::cache::Provenance;
use crate::cache::decode;
use crate::cache::decode_stamp;
use crate::cache::encode;
use crate::cache::is_fresh;
use crate::cache::namespace_prefix;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::error::SourceError;
use crate::notify::LogNotifier;
use crate::notify::Notification;
use crate::notify::Notifier;
use crate::outcome::FetchFailure;
use crate::outcome::Outcome;
use crate::source::CachePayload;
use crate::source::RemoteSource;

type InFlight<P> = Shared<BoxFuture<'static, Outcome<P>>>;

/// Serves results from cache when fresh and fetches them otherwise.
///
/// Every terminal outcome is reported to the notifier exactly once, so
/// callers only render the returned [`Outcome`]. Concurrent fetches for the
/// same key share a single request and a single cache write.
///
/// This type is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use newsdesk_lib::FetchOrchestratorBuilder;
/// use newsdesk_lib::auth::SessionGuard;
/// use newsdesk_lib::cache::{FreshnessWindow, SqliteStore};
/// use newsdesk_lib::model::NewsQuery;
/// use newsdesk_lib::source::HttpNewsSource;
///
/// let guard = Arc::new(SessionGuard::with_token(token));
/// let orchestrator = FetchOrchestratorBuilder::new()
///     .source(HttpNewsSource::new("http://localhost:5000", guard.clone())?)
///     .auth(guard)
///     .store(SqliteStore::open("cache.db").await?)
///     .build();
///
/// let query = NewsQuery::new("AAPL", 5)?;
/// let key = orchestrator.key(query.stock());
/// let outcome = orchestrator.fetch(&key, query, FreshnessWindow::ON_SEARCH).await;
/// ```
pub struct FetchOrchestrator<S: RemoteSource> {
    inner: Arc<Inner<S>>,
}

impl<S: RemoteSource> Clone for FetchOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S: RemoteSource> {
    source: S,
    auth: Arc<dyn AuthGuard>,
    store: Arc<dyn CacheStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    in_flight: DashMap<CacheKey, InFlight<S::Payload>>,
}

impl<S: RemoteSource> FetchOrchestrator<S> {
    /// Builds the key for `subject` in this orchestrator's namespace.
    pub fn key(&self, subject: &str) -> CacheKey {
        CacheKey::new(&self.inner.config.namespace, subject)
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Number of requests currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Resolves `key` from cache or from the remote source.
    ///
    /// A fresh entry under `window` is returned without touching the network
    /// or the auth guard. Otherwise one request is issued, unless one for
    /// the same key is already pending, in which case its result is shared.
    ///
    /// The request runs in its own task: dropping this future does not
    /// cancel it, and a successful response is still written to the cache.
    pub async fn fetch(
        &self,
        key: &CacheKey,
        params: S::Params,
        window: FreshnessWindow,
    ) -> Outcome<S::Payload> {
        let inner = &self.inner;

        if let Some(envelope) = inner.read(key).await {
            if is_fresh(Some(&envelope), window, inner.clock.now_millis()) {
                debug!("cache hit for {}", key);
                inner.notify_loaded(key, &envelope.provenance);
                return Outcome::Hit(envelope.payload);
            }
            debug!("cache entry for {} is stale", key);
        } else {
            debug!("cache miss for {}", key);
        }

        if !inner.auth.is_authenticated() {
            debug!("not authenticated, skipping request for {}", key);
            inner.notify(Notification::error("Authentication required").for_key(key));
            inner.auth.require_reauth();
            return Outcome::Unauthenticated;
        }

        let (pending, leader) = match inner.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!("joining in-flight request for {}", key);
                (entry.get().clone(), None)
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = oneshot::channel();
                let pending = rx
                    .map(|result| {
                        result.unwrap_or_else(|_| {
                            Outcome::Failed(FetchFailure::Other(
                                "request task ended without a result".to_string(),
                            ))
                        })
                    })
                    .boxed()
                    .shared();
                entry.insert(pending.clone());
                (pending, Some(tx))
            }
        };

        if let Some(tx) = leader {
            let inner = Arc::clone(inner);
            let key = key.clone();
            tokio::spawn(async move {
                let request = tokio::spawn({
                    let inner = Arc::clone(&inner);
                    let key = key.clone();
                    async move { inner.resolve(&key, params).await }
                });
                let outcome = match request.await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        warn!("request task for {} failed: {}", key, err);
                        inner.fail(
                            &key,
                            FetchFailure::Other("Request failed unexpectedly".to_string()),
                        )
                    }
                };
                inner.in_flight.remove(&key);
                let _ = tx.send(outcome);
            });
        }

        pending.await
    }

    /// Returns the cached envelope for `key` if it is fresh under `window`.
    ///
    /// Never contacts the remote source or the auth guard. Malformed entries
    /// are deleted.
    pub async fn peek(
        &self,
        key: &CacheKey,
        window: FreshnessWindow,
    ) -> Option<CacheEnvelope<S::Payload>> {
        let inner = &self.inner;
        let envelope = inner.read(key).await?;
        if !is_fresh(Some(&envelope), window, inner.clock.now_millis()) {
            debug!("peek: cache entry for {} is stale", key);
            return None;
        }
        inner.notify_loaded(key, &envelope.provenance);
        Some(envelope)
    }

    /// Deletes the entry for `key`.
    pub async fn invalidate(&self, key: &CacheKey) {
        debug!("invalidating {}", key);
        self.inner.store.delete(key.as_str()).await;
    }

    /// Deletes every entry in the namespace and returns how many there were.
    pub async fn clear(&self) -> usize {
        let keys = self.inner.namespace_keys().await;
        for key in &keys {
            self.inner.store.delete(key).await;
        }
        debug!("cleared {} cache entries", keys.len());
        keys.len()
    }

    /// Deletes entries at least `max_age` old and entries that cannot be decoded.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired(&self, max_age: Duration) -> usize {
        let inner = &self.inner;
        let max_age = FreshnessWindow::new(max_age).as_millis();
        let now = inner.clock.now_millis();
        let mut purged = 0;

        for key in inner.namespace_keys().await {
            let Some(bytes) = inner.store.get(&key).await else {
                continue;
            };
            let expired = match decode_stamp(&bytes) {
                Ok(stamp) => now.saturating_sub(stamp) >= max_age,
                Err(_) => true,
            };
            if expired {
                inner.store.delete(&key).await;
                purged += 1;
            }
        }

        if purged > 0 {
            debug!("purged {} expired cache entries", purged);
        }
        purged
    }

    /// Runs [`purge_expired`](Self::purge_expired) every `interval`.
    ///
    /// The first sweep runs immediately. Abort the returned handle to stop.
    pub fn spawn_sweeper(&self, interval: Duration, max_age: Duration) -> JoinHandle<()> {
        let orchestrator = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                orchestrator.purge_expired(max_age).await;
            }
        })
    }
}

impl<S: RemoteSource> Inner<S> {
    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    fn notify_exclusions(&self, key: &CacheKey, provenance: &Provenance) {
        if provenance.has_exclusions() {
            let sources: Vec<&str> = provenance
                .excluded_sources
                .iter()
                .map(String::as_str)
                .collect();
            self.notify(
                Notification::warning(format!("Excluded sources: {}", sources.join(", ")))
                    .for_key(key)
                    .with_provenance(provenance),
            );
        }
    }

    fn notify_loaded(&self, key: &CacheKey, provenance: &Provenance) {
        self.notify(
            Notification::info(format!("Loaded cached results for {}", key.subject()))
                .for_key(key)
                .with_provenance(provenance),
        );
        self.notify_exclusions(key, provenance);
    }

    /// Reads and decodes the entry for `key`, deleting it if malformed.
    async fn read(&self, key: &CacheKey) -> Option<CacheEnvelope<S::Payload>> {
        let bytes = self.store.get(key.as_str()).await?;
        match decode(&bytes) {
            Ok(envelope) => Some(envelope),
            Err(err) => {
                warn!("purging malformed cache entry {}: {}", key, err);
                self.store.delete(key.as_str()).await;
                None
            }
        }
    }

    async fn namespace_keys(&self) -> Vec<String> {
        self.store
            .keys_with_prefix(&namespace_prefix(&self.config.namespace))
            .await
    }

    /// Issues the request and applies its result.
    async fn resolve(&self, key: &CacheKey, params: S::Params) -> Outcome<S::Payload> {
        debug!("requesting {}", key);
        match self.source.fetch(key, params).await {
            Ok(response) => {
                self.store_response(key, &response.payload, &response.provenance)
                    .await;
                self.notify(
                    Notification::success(format!(
                        "Found {} results for {} in {:.2}s ({})",
                        response.payload.item_count(),
                        key.subject(),
                        response.provenance.fetch_duration_seconds,
                        response.provenance.source.label()
                    ))
                    .for_key(key)
                    .with_provenance(&response.provenance),
                );
                self.notify_exclusions(key, &response.provenance);
                Outcome::Fetched(response.payload)
            }
            Err(SourceError::Unauthorized) => {
                debug!("session rejected while requesting {}", key);
                self.notify(
                    Notification::error("Session expired, please log in again").for_key(key),
                );
                self.auth.require_reauth();
                Outcome::Unauthenticated
            }
            Err(SourceError::RateLimited) => self.fail(key, FetchFailure::RateLimited),
            Err(SourceError::Other(message)) => self.fail(key, FetchFailure::Other(message)),
        }
    }

    fn fail(&self, key: &CacheKey, failure: FetchFailure) -> Outcome<S::Payload> {
        debug!("request for {} failed: {}", key, failure.message());
        self.notify(Notification::error(failure.message()).for_key(key));
        Outcome::Failed(failure)
    }

    async fn store_response(&self, key: &CacheKey, payload: &S::Payload, provenance: &Provenance) {
        let bytes = match encode(payload, provenance, self.clock.now_millis()) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("failed to encode cache entry {}: {}", key, err);
                return;
            }
        };
        self.store.set(key.as_str(), bytes).await;

        if let Some(max_entries) = self.config.max_entries {
            self.enforce_capacity(max_entries, key).await;
        }
    }

    /// Deletes the oldest entries until at most `max_entries` remain.
    ///
    /// Entries without a readable stamp go first. `written` is never evicted.
    async fn enforce_capacity(&self, max_entries: usize, written: &CacheKey) {
        let keys = self.namespace_keys().await;
        if keys.len() <= max_entries {
            return;
        }

        let mut stamped = Vec::with_capacity(keys.len());
        for key in keys.into_iter().filter(|k| k != written.as_str()) {
            let stamp = match self.store.get(&key).await {
                Some(bytes) => decode_stamp(&bytes).ok(),
                None => continue,
            };
            stamped.push((stamp, key));
        }
        stamped.sort();

        let excess = (stamped.len() + 1).saturating_sub(max_entries);
        for (_, key) in stamped.into_iter().take(excess) {
            debug!("evicting {}", key);
            self.store.delete(&key).await;
        }
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`FetchOrchestrator`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `source` - A [`RemoteSource`] implementation
/// - `auth` - An [`AuthGuard`] implementation
///
/// # Defaults
///
/// - `store` - [`InMemoryStore`]
/// - `notifier` - [`LogNotifier`]
/// - `clock` - [`SystemClock`]
/// - `config` - [`CacheConfig::default`]
pub struct FetchOrchestratorBuilder<Src, Auth> {
    source: Src,
    auth: Auth,
    store: Option<Arc<dyn CacheStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn Clock>>,
    config: CacheConfig,
}

impl FetchOrchestratorBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            source: Missing,
            auth: Missing,
            store: None,
            notifier: None,
            clock: None,
            config: CacheConfig::default(),
        }
    }
}

impl Default for FetchOrchestratorBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> FetchOrchestratorBuilder<Missing, A> {
    /// Sets the remote source.
    pub fn source<S: RemoteSource>(self, source: S) -> FetchOrchestratorBuilder<Set<S>, A> {
        FetchOrchestratorBuilder {
            source: Set(source),
            auth: self.auth,
            store: self.store,
            notifier: self.notifier,
            clock: self.clock,
            config: self.config,
        }
    }
}

impl<S> FetchOrchestratorBuilder<S, Missing> {
    /// Sets the auth guard.
    pub fn auth<G: AuthGuard + 'static>(
        self,
        guard: G,
    ) -> FetchOrchestratorBuilder<S, Set<Arc<dyn AuthGuard>>> {
        FetchOrchestratorBuilder {
            source: self.source,
            auth: Set(Arc::new(guard) as Arc<dyn AuthGuard>),
            store: self.store,
            notifier: self.notifier,
            clock: self.clock,
            config: self.config,
        }
    }
}

impl<S, A> FetchOrchestratorBuilder<S, A> {
    /// Sets the cache store.
    pub fn store<T: CacheStore + 'static>(mut self, store: T) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets the notification sink.
    pub fn notifier<N: Notifier + 'static>(mut self, notifier: N) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Sets the clock used to stamp and age entries.
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Sets the cache configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }
}

impl<S: RemoteSource> FetchOrchestratorBuilder<Set<S>, Set<Arc<dyn AuthGuard>>> {
    /// Builds the [`FetchOrchestrator`].
    ///
    /// This method is only available when both `source` and `auth` have been set.
    pub fn build(self) -> FetchOrchestrator<S> {
        FetchOrchestrator {
            inner: Arc::new(Inner {
                source: self.source.0,
                auth: self.auth.0,
                store: self
                    .store
                    .unwrap_or_else(|| Arc::new(InMemoryStore::new())),
                notifier: self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                config: self.config,
                in_flight: DashMap::new(),
            }),
        }
    }
}
