//! Session management.
//!
//! This module provides:
//! - `Session`: the persisted `{identifier, role}` record
//! - `SessionContext`: the explicit context handed to every gated operation
//!
//! Any non-empty identifier and credential are accepted at login. The session
//! has no expiry; it is removed on logout.

pub mod session;

pub use session::{LoginError, Session, SessionContext, SessionData};
