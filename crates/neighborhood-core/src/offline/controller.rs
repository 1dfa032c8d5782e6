//! Offline cache controller.
//!
//! Mirrors a service worker's lifecycle: `install` pre-caches the app shell,
//! `activate` purges stores from older versions, and `handle_fetch`
//! intercepts GET requests with one of two policies:
//! - static assets are cache-first and never fall back to stale copies
//! - documents are network-first and fall back through cached pages

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    cache_key, CacheStorage, CachedResponse, FetchError, Network, Request, RequestKind, Response,
};

// ============================================================================
// Constants
// ============================================================================

/// Current store name. Bumping the version invalidates every older store on
/// the next activation.
pub const CACHE_NAME: &str = "smartneighbor-v3";

/// App shell fetched eagerly at install, relative to the origin.
pub const PRECACHE_PATHS: [&str; 9] = [
    "/",
    "/dashboard",
    "/residents",
    "/security-schedule",
    "/feedback",
    "/announcements",
    "/login",
    "/manifest.json",
    "/icon.svg",
];

/// Cached pages tried, in order, when a document is unreachable and has no
/// cached copy of its own.
const FALLBACK_PATHS: [&str; 2] = ["/dashboard", "/"];

/// Network fetch timeout in seconds. A timeout counts as being offline.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Pre-cache requests in flight at once during install.
const MAX_CONCURRENT_PRECACHE: usize = 4;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    /// Installed and waiting to take over
    Installed,
    Active,
    /// Replaced by a newer version; intercepts nothing
    Superseded,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Active => "active",
            WorkerState::Superseded => "superseded",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Cannot {action} a worker that is {state}")]
    InvalidState {
        action: &'static str,
        state: WorkerState,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Where a served response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    /// The request's own cached entry
    Cache,
    /// Another cached page, by cache key
    Fallback(String),
    /// Synthesized offline response
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the caller performs the request itself.
    Passthrough,
    Respond {
        response: Response,
        source: ResponseSource,
    },
}

impl FetchOutcome {
    fn respond(response: Response, source: ResponseSource) -> Self {
        FetchOutcome::Respond { response, source }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Respond { response, .. } => Some(response),
            FetchOutcome::Passthrough => None,
        }
    }

    pub fn source(&self) -> Option<&ResponseSource> {
        match self {
            FetchOutcome::Respond { source, .. } => Some(source),
            FetchOutcome::Passthrough => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Cache keys stored
    pub cached: Vec<String>,
    /// Paths that failed, with the reason
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    /// Stores deleted for carrying a stale version
    pub purged: Vec<String>,
}

// ============================================================================
// Controller
// ============================================================================

/// One version of the offline cache worker.
pub struct OfflineCache<S: CacheStorage, N: Network> {
    storage: Arc<S>,
    network: N,
    origin: Url,
    cache_name: String,
    precache: Vec<String>,
    fetch_timeout: Duration,
    skip_waiting: bool,
    state: WorkerState,
    clients_claimed: bool,
}

impl<S: CacheStorage, N: Network> OfflineCache<S, N> {
    pub fn new(storage: Arc<S>, network: N, origin: Url) -> Self {
        Self {
            storage,
            network,
            origin,
            cache_name: CACHE_NAME.to_string(),
            precache: PRECACHE_PATHS.iter().map(|p| p.to_string()).collect(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            skip_waiting: true,
            state: WorkerState::Installing,
            clients_claimed: false,
        }
    }

    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    pub fn with_precache<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.precache = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Whether an installed worker takes over at once instead of waiting
    /// for the previous version's clients to go away.
    pub fn with_skip_waiting(mut self, skip_waiting: bool) -> Self {
        self.skip_waiting = skip_waiting;
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn skip_waiting(&self) -> bool {
        self.skip_waiting
    }

    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed
    }

    /// Entries of this version's store.
    pub fn entries(&self) -> anyhow::Result<Vec<(String, CachedResponse)>> {
        self.storage.entries(&self.cache_name)
    }

    fn expect_state(&self, expected: WorkerState, action: &'static str) -> Result<(), LifecycleError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidState {
                action,
                state: self.state,
            })
        }
    }

    fn resolve(&self, path: &str) -> Result<Url, String> {
        self.origin.join(path).map_err(|e| format!("Invalid URL {}: {}", path, e))
    }

    // ===== Lifecycle =====

    /// Open this version's store and pre-cache the app shell. Individual
    /// failures are logged and reported; install itself only fails when the
    /// store cannot be opened.
    pub async fn install(&mut self) -> Result<InstallReport, LifecycleError> {
        self.expect_state(WorkerState::Installing, "install")?;
        self.storage.open(&self.cache_name)?;
        info!(cache = %self.cache_name, urls = self.precache.len(), "Installing offline cache");

        let this = &*self;
        let mut results: Vec<(usize, String, Result<String, String>)> =
            stream::iter(this.precache.iter().enumerate())
                .map(|(index, path)| async move {
                    (index, path.clone(), this.precache_one(path).await)
                })
                .buffer_unordered(MAX_CONCURRENT_PRECACHE)
                .collect()
                .await;
        results.sort_by_key(|(index, _, _)| *index);

        let mut report = InstallReport::default();
        for (_, path, result) in results {
            match result {
                Ok(key) => report.cached.push(key),
                Err(reason) => {
                    warn!(path = %path, reason = %reason, "Failed to pre-cache URL");
                    report.failed.push((path, reason));
                }
            }
        }

        self.state = WorkerState::Installed;
        info!(
            cache = %self.cache_name,
            cached = report.cached.len(),
            failed = report.failed.len(),
            "Offline cache installed"
        );
        Ok(report)
    }

    async fn precache_one(&self, path: &str) -> Result<String, String> {
        let request = Request::get(self.resolve(path)?);
        let response = self
            .fetch_network(&request)
            .await
            .map_err(|e| e.to_string())?;
        if !response.is_cacheable() {
            return Err(format!("Unexpected status {}", response.status));
        }
        let key = request.cache_key();
        self.storage
            .put(&self.cache_name, &key, &response)
            .map_err(|e| format!("{:#}", e))?;
        Ok(key)
    }

    /// Delete every store but this version's, then take control of open
    /// clients. Returns once deletion has finished.
    pub async fn activate(&mut self) -> Result<ActivateReport, LifecycleError> {
        self.expect_state(WorkerState::Installed, "activate")?;

        let report = self.purge_stale()?;

        self.state = WorkerState::Active;
        self.clients_claimed = true;
        debug!(cache = %self.cache_name, "Offline cache active");
        Ok(report)
    }

    /// Take over a store installed by an earlier run of this version
    /// without re-fetching. Returns false when no such store exists.
    /// Take over a store an earlier run installed. Stale stores left by a
    /// run that never activated are purged as on activation.
    pub(crate) fn resume(&mut self) -> Result<Option<ActivateReport>, LifecycleError> {
        self.expect_state(WorkerState::Installing, "resume")?;
        if !self.storage.cache_names()?.contains(&self.cache_name) {
            return Ok(None);
        }
        let report = self.purge_stale()?;
        self.state = WorkerState::Active;
        self.clients_claimed = true;
        debug!(cache = %self.cache_name, "Resumed installed offline cache");
        Ok(Some(report))
    }

    fn purge_stale(&self) -> Result<ActivateReport, LifecycleError> {
        let mut report = ActivateReport::default();
        for name in self.storage.cache_names()? {
            if name != self.cache_name && self.storage.delete_cache(&name)? {
                info!(cache = %name, "Purged stale cache");
                report.purged.push(name);
            }
        }
        Ok(report)
    }

    pub(crate) fn supersede(&mut self) {
        self.state = WorkerState::Superseded;
        self.clients_claimed = false;
    }

    // ===== Interception =====

    /// Apply the caching policy to one request.
    ///
    /// Non-GET requests, and every request while this worker is not active,
    /// pass through untouched.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        if self.state != WorkerState::Active || !request.is_get() {
            return FetchOutcome::Passthrough;
        }
        match request.kind() {
            RequestKind::StaticAsset => self.cache_first(request).await,
            RequestKind::Document => self.network_first(request).await,
        }
    }

    async fn cache_first(&self, request: &Request) -> FetchOutcome {
        let key = request.cache_key();
        if let Some(cached) = self.lookup(&key) {
            debug!(url = %key, "Serving asset from cache");
            return FetchOutcome::respond(cached.data, ResponseSource::Cache);
        }

        match self.fetch_network(request).await {
            Ok(response) => {
                self.store(&key, &response);
                FetchOutcome::respond(response, ResponseSource::Network)
            }
            Err(e) => {
                warn!(url = %key, error = %e, "Asset unavailable offline");
                FetchOutcome::respond(Response::asset_offline(&request.url), ResponseSource::Offline)
            }
        }
    }

    async fn network_first(&self, request: &Request) -> FetchOutcome {
        let key = request.cache_key();
        let error = match self.fetch_network(request).await {
            Ok(response) => {
                self.store(&key, &response);
                return FetchOutcome::respond(response, ResponseSource::Network);
            }
            Err(e) => e,
        };
        debug!(url = %key, error = %error, "Network failed, trying cache");

        if let Some(cached) = self.lookup(&key) {
            return FetchOutcome::respond(cached.data, ResponseSource::Cache);
        }

        for path in FALLBACK_PATHS {
            let Ok(url) = self.resolve(path) else {
                continue;
            };
            let fallback_key = cache_key(&url);
            if let Some(cached) = self.lookup(&fallback_key) {
                debug!(url = %key, fallback = %fallback_key, "Serving fallback page");
                return FetchOutcome::respond(cached.data, ResponseSource::Fallback(fallback_key));
            }
        }

        warn!(url = %key, "No cached page available offline");
        FetchOutcome::respond(Response::offline_page(&request.url), ResponseSource::Offline)
    }

    async fn fetch_network(&self, request: &Request) -> Result<Response, FetchError> {
        match tokio::time::timeout(self.fetch_timeout, self.network.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        }
    }

    /// Cache read; a storage error counts as a miss.
    fn lookup(&self, key: &str) -> Option<CachedResponse> {
        match self.storage.get(&self.cache_name, key) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(url = %key, error = %format!("{:#}", e), "Cache read failed");
                None
            }
        }
    }

    /// Store a copy of a 200 response before it is returned.
    fn store(&self, key: &str, response: &Response) {
        if !response.is_cacheable() {
            return;
        }
        if let Err(e) = self.storage.put(&self.cache_name, key, response) {
            warn!(url = %key, error = %format!("{:#}", e), "Cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::testing::{FakeNetwork, ORIGIN};
    use crate::offline::{DiskStorage, MemoryStorage};
    use crate::utils::test_dir;
    use reqwest::Method;

    type TestCache = OfflineCache<MemoryStorage, Arc<FakeNetwork>>;

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    fn get(path: &str) -> Request {
        Request::get(url(path))
    }

    fn new_cache(storage: &Arc<MemoryStorage>, network: &Arc<FakeNetwork>) -> TestCache {
        OfflineCache::new(Arc::clone(storage), Arc::clone(network), Url::parse(ORIGIN).unwrap())
    }

    async fn active_cache(storage: &Arc<MemoryStorage>, network: &Arc<FakeNetwork>) -> TestCache {
        let mut cache = new_cache(storage, network);
        cache.install().await.unwrap();
        cache.activate().await.unwrap();
        cache
    }

    #[tokio::test]
    async fn test_install_precaches_and_swallows_failures() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        network.serve(url("/icon.svg").as_str(), 404, "missing");

        let mut cache = new_cache(&storage, &network);
        let report = cache.install().await.unwrap();

        assert_eq!(cache.state(), WorkerState::Installed);
        assert!(cache.skip_waiting());
        assert_eq!(report.cached.len(), 8);
        assert_eq!(report.cached[0], url("/").to_string());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "/icon.svg");
        assert!(storage.get(CACHE_NAME, url("/dashboard").as_str()).unwrap().is_some());
        assert!(storage.get(CACHE_NAME, url("/icon.svg").as_str()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_install_succeeds_fully_offline() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        network.set_offline(true);

        let mut cache = new_cache(&storage, &network);
        let report = cache.install().await.unwrap();
        assert!(report.cached.is_empty());
        assert_eq!(report.failed.len(), PRECACHE_PATHS.len());
        assert_eq!(storage.cache_names().unwrap(), vec![CACHE_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_lifecycle_order_enforced() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let mut cache = new_cache(&storage, &network);

        assert!(matches!(
            cache.activate().await,
            Err(LifecycleError::InvalidState { action: "activate", state: WorkerState::Installing })
        ));
        cache.install().await.unwrap();
        assert!(matches!(
            cache.install().await,
            Err(LifecycleError::InvalidState { action: "install", .. })
        ));
        cache.activate().await.unwrap();
        assert_eq!(cache.state(), WorkerState::Active);
        assert!(cache.clients_claimed());
    }

    #[tokio::test]
    async fn test_activate_purges_stale_caches() {
        let storage = Arc::new(MemoryStorage::new());
        let stale = Response::new(url("/").as_str(), 200, "old");
        storage.put("smartneighbor-v1", url("/").as_str(), &stale).unwrap();
        storage.put("smartneighbor-v2", url("/").as_str(), &stale).unwrap();
        storage.open("unrelated").unwrap();

        let network = FakeNetwork::serving_shell();
        let mut cache = new_cache(&storage, &network);
        cache.install().await.unwrap();
        let report = cache.activate().await.unwrap();

        assert_eq!(
            report.purged,
            vec!["smartneighbor-v1".to_string(), "smartneighbor-v2".to_string(), "unrelated".to_string()]
        );
        assert_eq!(storage.cache_names().unwrap(), vec![CACHE_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_non_get_and_inactive_pass_through() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();

        let installing = new_cache(&storage, &network);
        assert_eq!(installing.handle_fetch(&get("/dashboard")).await, FetchOutcome::Passthrough);

        let cache = active_cache(&storage, &network).await;
        let calls = network.calls();
        let post = Request::new(Method::POST, url("/api/residents"));
        assert_eq!(cache.handle_fetch(&post).await, FetchOutcome::Passthrough);
        assert_eq!(network.calls(), calls);
        assert!(storage.get(CACHE_NAME, url("/api/residents").as_str()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cached_asset_served_without_network() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let cache = active_cache(&storage, &network).await;

        let asset = Response::new(url("/_next/static/app.js").as_str(), 200, vec![0u8, 159, 146, 150]);
        storage.put(CACHE_NAME, url("/_next/static/app.js").as_str(), &asset).unwrap();
        network.serve(url("/_next/static/app.js").as_str(), 200, "newer");

        let calls = network.calls();
        let outcome = cache.handle_fetch(&get("/_next/static/app.js")).await;
        assert_eq!(network.calls(), calls);
        assert_eq!(outcome.source(), Some(&ResponseSource::Cache));
        assert_eq!(outcome.response().unwrap().body, vec![0u8, 159, 146, 150]);
    }

    #[tokio::test]
    async fn test_asset_miss_fetches_and_caches_only_200() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let cache = active_cache(&storage, &network).await;

        network.serve(url("/styles/app.css").as_str(), 200, "body{}");
        let outcome = cache.handle_fetch(&get("/styles/app.css")).await;
        assert_eq!(outcome.source(), Some(&ResponseSource::Network));
        assert_eq!(
            storage.get(CACHE_NAME, url("/styles/app.css").as_str()).unwrap().unwrap().data.text(),
            "body{}"
        );

        network.serve(url("/fonts/inter.woff2").as_str(), 500, "boom");
        let outcome = cache.handle_fetch(&get("/fonts/inter.woff2")).await;
        assert_eq!(outcome.response().unwrap().status, 500);
        assert!(storage.get(CACHE_NAME, url("/fonts/inter.woff2").as_str()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_uncached_asset_offline_is_503() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let cache = active_cache(&storage, &network).await;
        network.set_offline(true);

        let outcome = cache.handle_fetch(&get("/_next/static/chunk.js")).await;
        let response = outcome.response().unwrap();
        assert_eq!(outcome.source(), Some(&ResponseSource::Offline));
        assert_eq!(response.status, 503);
        assert_eq!(response.text(), "Asset offline");
    }

    #[tokio::test]
    async fn test_document_network_first_updates_cache() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let cache = active_cache(&storage, &network).await;

        network.serve(url("/announcements").as_str(), 200, "fresh announcements");
        let outcome = cache.handle_fetch(&get("/announcements")).await;
        assert_eq!(outcome.source(), Some(&ResponseSource::Network));

        network.set_offline(true);
        let outcome = cache.handle_fetch(&get("/announcements")).await;
        assert_eq!(outcome.source(), Some(&ResponseSource::Cache));
        assert_eq!(outcome.response().unwrap().text(), "fresh announcements");
    }

    #[tokio::test]
    async fn test_document_network_first_on_disk() {
        let dir = test_dir("controller-disk");
        let storage = Arc::new(DiskStorage::new(dir.clone()).unwrap());
        let network = FakeNetwork::serving_shell();
        let mut cache = OfflineCache::new(
            Arc::clone(&storage),
            Arc::clone(&network),
            Url::parse(ORIGIN).unwrap(),
        );
        cache.install().await.unwrap();
        cache.activate().await.unwrap();

        network.serve(url("/feedback").as_str(), 200, "fresh feedback");
        let outcome = cache.handle_fetch(&get("/feedback")).await;
        assert_eq!(outcome.source(), Some(&ResponseSource::Network));

        network.set_offline(true);
        let outcome = cache.handle_fetch(&get("/feedback")).await;
        assert_eq!(outcome.source(), Some(&ResponseSource::Cache));
        assert_eq!(outcome.response().unwrap().text(), "fresh feedback");

        // A fresh handle on the same directory sees the entry
        let reopened = DiskStorage::new(dir.clone()).unwrap();
        let cached = reopened.get(CACHE_NAME, url("/feedback").as_str()).unwrap().unwrap();
        assert_eq!(cached.data.text(), "fresh feedback");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_document_error_status_not_cached() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let cache = active_cache(&storage, &network).await;

        network.serve(url("/residents").as_str(), 500, "server error");
        let outcome = cache.handle_fetch(&get("/residents")).await;
        assert_eq!(outcome.response().unwrap().status, 500);
        assert_eq!(outcome.source(), Some(&ResponseSource::Network));

        // The pre-cached copy survives
        network.set_offline(true);
        let outcome = cache.handle_fetch(&get("/residents")).await;
        assert_eq!(outcome.response().unwrap().text(), "page /residents");
    }

    #[tokio::test]
    async fn test_document_fallback_chain() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let cache = active_cache(&storage, &network).await;
        network.set_offline(true);

        let outcome = cache.handle_fetch(&get("/reports/42")).await;
        assert_eq!(
            outcome.source(),
            Some(&ResponseSource::Fallback(url("/dashboard").to_string()))
        );
        assert_eq!(outcome.response().unwrap().text(), "page /dashboard");

        storage.delete_cache(CACHE_NAME).unwrap();
        storage.put(CACHE_NAME, url("/").as_str(), &Response::new(url("/").as_str(), 200, "home")).unwrap();
        let outcome = cache.handle_fetch(&get("/reports/42")).await;
        assert_eq!(outcome.source(), Some(&ResponseSource::Fallback(url("/").to_string())));
        assert_eq!(outcome.response().unwrap().text(), "home");

        storage.delete_cache(CACHE_NAME).unwrap();
        let outcome = cache.handle_fetch(&get("/reports/42")).await;
        let response = outcome.response().unwrap();
        assert_eq!(outcome.source(), Some(&ResponseSource::Offline));
        assert_eq!(response.status, 503);
        assert!(response.text().contains("offline"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_network_times_out_to_cache() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let cache = active_cache(&storage, &network).await;

        network.set_delay(Duration::from_secs(60));
        let outcome = cache.handle_fetch(&get("/dashboard")).await;
        assert_eq!(outcome.source(), Some(&ResponseSource::Cache));

        let outcome = cache.handle_fetch(&get("/_next/static/late.js")).await;
        assert_eq!(outcome.source(), Some(&ResponseSource::Offline));
        assert_eq!(outcome.response().unwrap().status, 503);
    }

    #[tokio::test]
    async fn test_concurrent_fetches() {
        let storage = Arc::new(MemoryStorage::new());
        let network = FakeNetwork::serving_shell();
        let cache = active_cache(&storage, &network).await;

        let requests: Vec<Request> = PRECACHE_PATHS.iter().map(|p| get(p)).collect();
        let outcomes = futures::future::join_all(requests.iter().map(|r| cache.handle_fetch(r))).await;
        assert!(outcomes
            .iter()
            .all(|o| o.source() == Some(&ResponseSource::Network)));
    }
}
