use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::{Request, Response};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),
}

/// The live network the offline cache falls back from.
///
/// Any non-error result, whatever its status, counts as a network response.
pub trait Network: Send + Sync {
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response, FetchError>> + Send;
}

impl<N: Network> Network for Arc<N> {
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response, FetchError>> + Send {
        (**self).fetch(request)
    }
}
