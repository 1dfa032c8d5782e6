//! Smart Neighborhood core library.
//!
//! Shared logic for the neighborhood front-ends:
//! - `permissions`: the role to capability-set resolver
//! - `auth`: the persisted session and the injected `SessionContext`
//! - `models`: residents, security schedule, announcements, feedback, reports
//! - `store`: permission-checked services over in-memory collections
//! - `screens`: screen gating, sidebar menu and management affordances
//! - `offline`: the offline cache controller (install, activate, fetch)
//! - `api`: HTTP client for the backend API
//! - `config`: configuration file and environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod offline;
pub mod permissions;
pub mod screens;
pub mod store;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, SessionContext};
pub use config::Config;
pub use permissions::{Permission, Permissions, Role};
pub use screens::{open_screen, Screen, ScreenAccess};
pub use store::{ActionError, Neighborhood};
