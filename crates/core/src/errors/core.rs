use thiserror::Error;

use crate::config::ConfigError;
use crate::persistence::PersistenceError;

/// Core error type for the auto-creation registry
#[derive(Debug, Error)]
pub enum AutoCreateError {
    #[error(
        "The alias type '{key}' cannot be resolved to the concrete instance of '{incoming}' \
         because it is already associated with an instance of '{existing}'"
    )]
    DuplicateKey {
        key: String,
        existing: String,
        incoming: String,
    },

    #[error("Type discovery failed: {message}")]
    Discovery { message: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Persistence error for '{key}': {source}")]
    Persistence {
        key: String,
        source: PersistenceError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Type '{type_name}' is not a restorable singleton")]
    NotRestorable { type_name: String },
}

impl AutoCreateError {
    /// Create a new duplicate key error
    pub fn duplicate_key(
        key: impl Into<String>,
        existing: impl Into<String>,
        incoming: impl Into<String>,
    ) -> Self {
        Self::DuplicateKey {
            key: key.into(),
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }

    /// Create a new discovery error
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    /// Create a new lock error
    pub fn lock(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Create a new persistence error
    pub fn persistence(key: impl Into<String>, source: PersistenceError) -> Self {
        Self::Persistence {
            key: key.into(),
            source,
        }
    }

    /// Check if the error is a duplicate key registration
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Check if the error is fatal for initialization
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey { .. } | Self::Discovery { .. } | Self::LockError { .. }
        )
    }
}
