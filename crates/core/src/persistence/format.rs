use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::persistence::PersistenceError;

/// Encoding of persisted singleton payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Json,
    Yaml,
}

impl PayloadFormat {
    /// Decode a payload into a value
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, PersistenceError> {
        if bytes.is_empty() {
            return Err(PersistenceError::EmptyPayload);
        }

        match self {
            PayloadFormat::Json => Ok(serde_json::from_slice(bytes)?),
            PayloadFormat::Yaml => Ok(serde_yaml::from_slice(bytes)?),
        }
    }

    /// Encode a value into a payload
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>, PersistenceError> {
        match self {
            PayloadFormat::Json => Ok(serde_json::to_vec_pretty(value)?),
            PayloadFormat::Yaml => Ok(serde_yaml::to_string(value)?.into_bytes()),
        }
    }
}

impl FromStr for PayloadFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(PayloadFormat::Json),
            "yaml" | "yml" => Ok(PayloadFormat::Yaml),
            _ => Err(ConfigError::invalid_value("payload_format", s, "json or yaml")),
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadFormat::Json => write!(f, "json"),
            PayloadFormat::Yaml => write!(f, "yaml"),
        }
    }
}
