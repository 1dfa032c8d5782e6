//! Offline cache controller for the web front-end.
//!
//! This module provides:
//! - `OfflineCache`: one worker version with install, activate and fetch
//!   interception
//! - `Registration`: sequences worker versions
//! - `CacheStorage`: named response stores, in memory or on disk
//! - `Network`: the live fetch the controller falls back from

pub mod controller;
pub mod http;
pub mod network;
pub mod registration;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use reqwest::{Method, Url};

pub use controller::{
    ActivateReport, FetchOutcome, InstallReport, LifecycleError, OfflineCache, ResponseSource,
    WorkerState, CACHE_NAME, DEFAULT_FETCH_TIMEOUT_SECS, PRECACHE_PATHS,
};
pub use http::{cache_key, classify, Request, RequestKind, Response};
pub use network::{FetchError, Network};
pub use registration::{RegisterReport, Registration, Startup};
pub use storage::{CacheStorage, CachedData, CachedResponse, DiskStorage, MemoryStorage};
