use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::AutoCreateConfig;
use crate::persistence::{PersistenceBridge, PersistenceError, StorageKey};

/// Persistence bridge backed by one file per storage key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    extension: String,
}

impl FileStore {
    /// Create a file store rooted at `root` using the `.bytes` extension
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: crate::config::DEFAULT_PAYLOAD_EXTENSION.to_string(),
        }
    }

    /// Create a file store from the storage settings of a configuration
    pub fn from_config(config: &AutoCreateConfig) -> Self {
        Self::new(&config.storage_root).with_extension(&config.payload_extension)
    }

    /// Set the extension appended to every storage key
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = if extension.is_empty() || extension.starts_with('.') {
            extension
        } else {
            format!(".{}", extension)
        };
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a storage key maps to
    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        let mut path = self.root.join(key.as_str()).into_os_string();
        path.push(&self.extension);
        PathBuf::from(path)
    }
}

impl PersistenceBridge for FileStore {
    fn try_load(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, PersistenceError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::trace!("No singleton payload at {}", path.display());
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, key: &StorageKey, payload: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, payload)?;
        tracing::debug!("Saved singleton payload '{}' to {}", key, path.display());
        Ok(())
    }
}
