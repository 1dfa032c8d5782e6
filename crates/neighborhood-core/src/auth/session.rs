use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::permissions::{Permission, Permissions, Role};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Display name used when the identifier has no usable local part.
const FALLBACK_DISPLAY_NAME: &str = "Admin";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Identifier is required")]
    MissingIdentifier,

    #[error("Password is required")]
    MissingCredential,
}

/// The persisted session record. No expiry: it lives until logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(alias = "email")]
    pub identifier: String,
    pub role: Role,
}

impl SessionData {
    /// Accept any non-empty identifier and credential. There is no real
    /// verification behind this.
    pub fn login(identifier: &str, credential: &str, role: Role) -> Result<Self, LoginError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(LoginError::MissingIdentifier);
        }
        if credential.is_empty() {
            return Err(LoginError::MissingCredential);
        }
        Ok(Self {
            identifier: identifier.to_string(),
            role,
        })
    }

    pub fn context(&self) -> SessionContext {
        SessionContext::new(self.identifier.clone(), self.role)
    }
}

/// Session context injected into every gated operation.
///
/// Holds the role's resolved capability set so callers never re-read or
/// re-parse the session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    identifier: String,
    role: Role,
    permissions: Permissions,
}

impl SessionContext {
    pub fn new(identifier: impl Into<String>, role: Role) -> Self {
        Self {
            identifier: identifier.into(),
            role,
            permissions: Permissions::for_role(role),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.allows(permission)
    }

    /// Author name derived from the identifier: the part before `@`.
    pub fn display_name(&self) -> String {
        let local = self.identifier.split('@').next().unwrap_or_default().trim();
        if local.is_empty() {
            FALLBACK_DISPLAY_NAME.to_string()
        } else {
            local.to_string()
        }
    }
}

/// Session persisted as a JSON file, the local-storage entry of the app.
pub struct Session {
    data_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            data: None,
        }
    }

    /// Load session from disk
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        debug!(identifier = %data.identifier, role = %data.role, "Session loaded");
        self.data = Some(data);
        Ok(true)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Log in, replacing any existing session, and persist it.
    pub fn login(&mut self, identifier: &str, credential: &str, role: Role) -> Result<SessionContext> {
        let data = SessionData::login(identifier, credential, role)?;
        let context = data.context();
        self.data = Some(data);
        self.save()?;
        info!(identifier = %context.identifier(), role = %role, "Logged in");
        Ok(context)
    }

    /// Clear session data and remove the session file
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// The injected context for the current session, if logged in
    pub fn context(&self) -> Option<SessionContext> {
        self.data.as_ref().map(SessionData::context)
    }

    pub fn is_valid(&self) -> bool {
        self.data.is_some()
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}
