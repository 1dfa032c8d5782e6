use std::fmt;

use thiserror::Error;

/// What a caller attempted on an entity collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    Reply,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::View => write!(f, "view"),
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
            Action::Reply => write!(f, "reply to"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Access denied: you do not have permission to {action} {entity}")]
    AccessDenied { action: Action, entity: &'static str },

    #[error("No {entity} with id {id}")]
    NotFound { entity: &'static str, id: u64 },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

impl ActionError {
    pub fn is_access_denied(&self) -> bool {
        matches!(self, ActionError::AccessDenied { .. })
    }
}
