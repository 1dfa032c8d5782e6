//! Role-based permission model.
//!
//! This module provides:
//! - `Role`: the three neighborhood roles (RT/RW admin, security, resident)
//! - `Permissions`: the fixed capability set resolved for each role
//! - `Permission`: a name for each individual capability flag
//!
//! The capability table is static. Every screen and every mutating action
//! resolves the session role through `Permissions::for_role` and checks the
//! single flag it needs.

pub mod capabilities;
pub mod role;

pub use capabilities::{Permission, Permissions};
pub use role::{Role, RoleError};
