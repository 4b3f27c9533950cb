use crate::config::{
    ConfigError, ConfigSource, ConfigValidator, ExtensionValidator, RelativePathValidator,
};
use crate::persistence::PayloadFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_STORAGE_ROOT: &str = "AUTOCREATE_STORAGE_ROOT";
pub const ENV_STORAGE_NAMESPACE: &str = "AUTOCREATE_STORAGE_NAMESPACE";
pub const ENV_PAYLOAD_EXTENSION: &str = "AUTOCREATE_PAYLOAD_EXTENSION";
pub const ENV_PAYLOAD_FORMAT: &str = "AUTOCREATE_PAYLOAD_FORMAT";
pub const ENV_SORT_DISCOVERY: &str = "AUTOCREATE_SORT_DISCOVERY";

pub const DEFAULT_STORAGE_ROOT: &str = "Resources";
pub const DEFAULT_STORAGE_NAMESPACE: &str = "Serialization/Singletons";
pub const DEFAULT_PAYLOAD_EXTENSION: &str = ".bytes";

/// Configuration trait for environment driven settings
pub trait EnvConfig: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCreateConfig {
    /// Directory the file store resolves storage keys against
    pub storage_root: PathBuf,
    /// Namespace prefix of every storage key
    pub storage_namespace: String,
    /// Extension appended to storage keys by the file store
    pub payload_extension: String,
    /// Serialization format of persisted singleton payloads
    pub payload_format: PayloadFormat,
    /// Sort discovered types by name so construction order is stable across builds
    pub sort_discovery: bool,
}

impl AutoCreateConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
            payload_extension: DEFAULT_PAYLOAD_EXTENSION.to_string(),
            payload_format: PayloadFormat::Json,
            sort_discovery: true,
        }
    }

    /// Set the storage root
    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Set the storage namespace
    pub fn with_storage_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.storage_namespace = namespace.into();
        self
    }

    /// Set the payload extension
    pub fn with_payload_extension(mut self, extension: impl Into<String>) -> Self {
        self.payload_extension = extension.into();
        self
    }

    /// Set the payload format
    pub fn with_payload_format(mut self, format: PayloadFormat) -> Self {
        self.payload_format = format;
        self
    }

    /// Parse and validate a YAML configuration document
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, picking the parser from its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&source),
            Some("json") => Self::from_json_str(&source),
            _ => Err(ConfigError::parsing(format!(
                "unsupported configuration file '{}', expected .yaml, .yml or .json",
                path.display()
            ))),
        }
    }
}

impl Default for AutoCreateConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvConfig for AutoCreateConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(root) = env::var(ENV_STORAGE_ROOT) {
            config.storage_root = PathBuf::from(root);
        }

        if let Ok(namespace) = env::var(ENV_STORAGE_NAMESPACE) {
            config.storage_namespace = namespace;
        }

        if let Ok(extension) = env::var(ENV_PAYLOAD_EXTENSION) {
            config.payload_extension = extension;
        }

        if let Ok(format) = env::var(ENV_PAYLOAD_FORMAT) {
            config.payload_format = format.parse()?;
        }

        if let Ok(sort) = env::var(ENV_SORT_DISCOVERY) {
            config.sort_discovery = sort.parse().map_err(|_| {
                ConfigError::invalid_value("sort_discovery", sort.clone(), "true or false")
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_root.as_os_str().is_empty() {
            return Err(ConfigError::missing_required(
                "storage_root",
                format!("set {} or provide storage_root in the config file", ENV_STORAGE_ROOT),
            ));
        }

        RelativePathValidator::new("storage_namespace").validate(&self.storage_namespace)?;
        ExtensionValidator::new("payload_extension").validate(&self.payload_extension)?;

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let fields = [
            ("storage_root", ENV_STORAGE_ROOT, DEFAULT_STORAGE_ROOT),
            ("storage_namespace", ENV_STORAGE_NAMESPACE, DEFAULT_STORAGE_NAMESPACE),
            ("payload_extension", ENV_PAYLOAD_EXTENSION, DEFAULT_PAYLOAD_EXTENSION),
            ("payload_format", ENV_PAYLOAD_FORMAT, "json"),
            ("sort_discovery", ENV_SORT_DISCOVERY, "true"),
        ];

        fields
            .into_iter()
            .map(|(field, var, default)| {
                let source = if env::var(var).is_ok() {
                    ConfigSource::EnvVar(var.to_string())
                } else {
                    ConfigSource::Default(default.to_string())
                };
                (field.to_string(), source)
            })
            .collect()
    }
}
