use std::sync::Arc;

use crate::config::AutoCreateConfig;
use crate::discovery::TypeCatalog;
use crate::errors::AutoCreateError;
use crate::persistence::{PayloadFormat, PersistenceBridge, PersistenceError, StorageKey};
use crate::registry::descriptor::Activation;
use crate::registry::{Boxed, MarkedType, TypeKey};

struct SettingsEntry {
    marked: MarkedType,
    storage_key: StorageKey,
    value: Boxed,
    loaded: bool,
}

/// Editable cache of every singleton restored from storage.
///
/// Loads the stored value of each `RestoreFromStorage` type, or its default
/// when nothing usable is stored, and writes edits back through the bridge.
/// The registry itself never saves.
pub struct SingletonSettings {
    bridge: Arc<dyn PersistenceBridge>,
    format: PayloadFormat,
    entries: Vec<SettingsEntry>,
}

impl SingletonSettings {
    pub fn load(
        catalog: &dyn TypeCatalog,
        bridge: Arc<dyn PersistenceBridge>,
        config: &AutoCreateConfig,
    ) -> Result<Self, AutoCreateError> {
        let format = config.payload_format;
        let mut entries = Vec::new();

        for marked in catalog.marked_types()? {
            let Activation::Restore { decode, fallback, .. } = *marked.activation() else {
                continue;
            };

            let key = marked.key();
            let storage_key = StorageKey::for_type(&config.storage_namespace, &key);
            let stored = bridge
                .try_load(&storage_key)
                .map_err(|error| AutoCreateError::persistence(storage_key.as_str(), error))?;

            let (value, loaded) = match stored {
                Some(bytes) => match decode(&bytes, format) {
                    Ok(value) => (value, true),
                    Err(error) => {
                        tracing::warn!(
                            "Stored data of '{}' is unreadable, editing defaults instead: {}",
                            key,
                            error
                        );
                        (fallback(), false)
                    }
                },
                None => (fallback(), false),
            };

            entries.push(SettingsEntry {
                marked,
                storage_key,
                value,
                loaded,
            });
        }

        tracing::debug!("Loaded settings for {} singleton(s)", entries.len());
        Ok(Self {
            bridge,
            format,
            entries,
        })
    }

    /// Restorable singleton types, in catalog order
    pub fn types(&self) -> Vec<TypeKey> {
        self.entries.iter().map(|entry| entry.marked.key()).collect()
    }

    pub fn storage_key(&self, key: &TypeKey) -> Option<&StorageKey> {
        self.entry(key).map(|entry| &entry.storage_key)
    }

    /// Whether the value of `key` came from storage rather than its default
    pub fn was_loaded(&self, key: &TypeKey) -> bool {
        self.entry(key).map(|entry| entry.loaded).unwrap_or(false)
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        let entry = self.entry(&TypeKey::of::<T>())?;
        (*entry.value).downcast_ref::<T>()
    }

    /// Edit the cached value of `T`. Returns `false` when `T` is not a
    /// restorable singleton.
    pub fn update<T: 'static>(&mut self, edit: impl FnOnce(&mut T)) -> bool {
        let key = TypeKey::of::<T>();
        let value = self
            .entries
            .iter_mut()
            .find(|entry| entry.marked.key() == key)
            .and_then(|entry| (*entry.value).downcast_mut::<T>());

        match value {
            Some(value) => {
                edit(value);
                true
            }
            None => false,
        }
    }

    /// Write the cached value of `T` through the bridge
    pub fn save<T: 'static>(&self) -> Result<(), AutoCreateError> {
        let key = TypeKey::of::<T>();
        let entry = self.entry(&key).ok_or_else(|| AutoCreateError::NotRestorable {
            type_name: key.name().to_string(),
        })?;
        self.write(entry)
    }

    /// Write every cached value through the bridge, returning how many were saved
    pub fn save_all(&self) -> Result<usize, AutoCreateError> {
        for entry in &self.entries {
            self.write(entry)?;
        }
        tracing::info!("Saved {} singleton payload(s)", self.entries.len());
        Ok(self.entries.len())
    }

    fn entry(&self, key: &TypeKey) -> Option<&SettingsEntry> {
        self.entries.iter().find(|entry| entry.marked.key() == *key)
    }

    fn write(&self, entry: &SettingsEntry) -> Result<(), AutoCreateError> {
        let Activation::Restore { encode, .. } = *entry.marked.activation() else {
            return Err(AutoCreateError::NotRestorable {
                type_name: entry.marked.key().name().to_string(),
            });
        };

        let persistence =
            |error: PersistenceError| AutoCreateError::persistence(entry.storage_key.as_str(), error);
        let payload = encode(&*entry.value, self.format).map_err(persistence)?;
        self.bridge
            .save(&entry.storage_key, &payload)
            .map_err(persistence)
    }
}

impl std::fmt::Debug for SingletonSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonSettings")
            .field("format", &self.format)
            .field("types", &self.types())
            .finish()
    }
}
