use thiserror::Error;

/// Errors raised while loading, decoding or saving singleton payloads
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON payload error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML payload error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Null byte stream in singleton payload")]
    EmptyPayload,

    #[error("Payload value is not a '{expected}'")]
    TypeMismatch { expected: &'static str },

    #[error("Storage backend error: {message}")]
    Backend { message: String },
}

impl PersistenceError {
    /// Create a new backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Check if the payload itself was unreadable, as opposed to the storage
    pub fn is_corrupt_payload(&self) -> bool {
        matches!(
            self,
            Self::Json(_) | Self::Yaml(_) | Self::EmptyPayload | Self::TypeMismatch { .. }
        )
    }
}
