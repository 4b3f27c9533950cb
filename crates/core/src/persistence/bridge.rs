use std::fmt;
use std::sync::Arc;

use crate::persistence::PersistenceError;
use crate::registry::TypeKey;

/// Location of a singleton payload: `<namespace>/<TypeName>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Build a key from a namespace path and a simple type name
    pub fn new(namespace: &str, type_name: &str) -> Self {
        let namespace = namespace.trim_end_matches('/');
        if namespace.is_empty() {
            Self(type_name.to_string())
        } else {
            Self(format!("{}/{}", namespace, type_name))
        }
    }

    /// Build the key a marked type is stored under
    pub fn for_type(namespace: &str, key: &TypeKey) -> Self {
        Self::new(namespace, key.simple_name())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Storage collaborator for singletons whose state survives restarts.
///
/// `try_load` must treat missing data as `Ok(None)`; only storage failures
/// are errors. The registry never calls `save`.
pub trait PersistenceBridge: Send + Sync {
    /// Fetch the payload stored under `key`, if any
    fn try_load(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Store `payload` under `key`, replacing any previous payload
    fn save(&self, key: &StorageKey, payload: &[u8]) -> Result<(), PersistenceError>;
}

impl<B: PersistenceBridge + ?Sized> PersistenceBridge for Arc<B> {
    fn try_load(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, PersistenceError> {
        (**self).try_load(key)
    }

    fn save(&self, key: &StorageKey, payload: &[u8]) -> Result<(), PersistenceError> {
        (**self).save(key, payload)
    }
}
