//! REST API client module for the neighborhood backend.
//!
//! This module provides the `ApiClient` for JSON requests against the
//! backend and for live page fetches on behalf of the offline cache.
//!
//! Authenticated requests carry `Authorization: Token <token>`.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
