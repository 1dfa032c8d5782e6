use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("Invalid role: {0:?} (expected admin, security or resident)")]
    InvalidRole(String),
}

/// A neighborhood role. A session carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// RT/RW neighborhood administrator
    Admin,
    /// Security staff on the shift rota
    Security,
    /// Regular resident (warga)
    Resident,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Security, Role::Resident];

    /// Wire name, as stored in the session file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Security => "security",
            Role::Resident => "resident",
        }
    }

    /// Display label shown next to the signed-in user.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "RT/RW",
            Role::Security => "Keamanan",
            Role::Resident => "Warga",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Role::Admin => "👨‍💼",
            Role::Security => "🔐",
            Role::Resident => "👤",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "security" => Ok(Role::Security),
            "resident" => Ok(Role::Resident),
            _ => Err(RoleError::InvalidRole(s.to_string())),
        }
    }
}
