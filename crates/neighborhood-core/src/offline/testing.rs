//! Scripted network for offline cache tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Url;

use super::{FetchError, Network, Request, Response, PRECACHE_PATHS};

pub(crate) const ORIGIN: &str = "http://localhost:3000";

#[derive(Default)]
pub(crate) struct FakeNetwork {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl FakeNetwork {
    /// Every pre-cached path answers 200 with body `page <path>`.
    pub(crate) fn serving_shell() -> Arc<Self> {
        let network = Arc::new(Self::default());
        let origin = Url::parse(ORIGIN).unwrap();
        for path in PRECACHE_PATHS {
            let url = origin.join(path).unwrap();
            network.serve(url.as_str(), 200, &format!("page {}", path));
        }
        network
    }

    pub(crate) fn serve(&self, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Response::new(url, status, body));
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network("connection refused".to_string()));
        }
        let found = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        Ok(found.unwrap_or_else(|| Response::new(request.url.as_str(), 404, "Not Found")))
    }
}
