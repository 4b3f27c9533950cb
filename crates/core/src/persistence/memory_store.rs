use std::collections::HashMap;
use std::sync::RwLock;

use crate::persistence::{PersistenceBridge, PersistenceError, StorageKey};

/// In-process persistence bridge
#[derive(Debug, Default)]
pub struct MemoryStore {
    payloads: RwLock<HashMap<StorageKey, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a payload
    pub fn with_payload(self, key: StorageKey, payload: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut payloads) = self.payloads.write() {
            payloads.insert(key, payload.into());
        }
        self
    }

    /// Get a copy of the payload stored under `key`
    pub fn get(&self, key: &StorageKey) -> Option<Vec<u8>> {
        self.payloads.read().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.payloads.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistenceBridge for MemoryStore {
    fn try_load(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, PersistenceError> {
        let payloads = self
            .payloads
            .read()
            .map_err(|_| PersistenceError::backend("memory store lock poisoned"))?;
        Ok(payloads.get(key).cloned())
    }

    fn save(&self, key: &StorageKey, payload: &[u8]) -> Result<(), PersistenceError> {
        let mut payloads = self
            .payloads
            .write()
            .map_err(|_| PersistenceError::backend("memory store lock poisoned"))?;
        payloads.insert(key.clone(), payload.to_vec());
        Ok(())
    }
}
