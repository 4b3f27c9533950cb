use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Parsing error: {message}")]
    ParsingError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        Self::ParsingError {
            message: message.into(),
        }
    }

    /// Name of the offending field, if the error is about one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingRequired { field, .. } | Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T> {
    /// Validate a configuration value
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

/// Rejects storage paths that escape the storage root
#[derive(Debug, Clone)]
pub struct RelativePathValidator {
    field: &'static str,
}

impl RelativePathValidator {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl ConfigValidator<String> for RelativePathValidator {
    fn validate(&self, value: &String) -> Result<(), ConfigError> {
        let escapes = value.starts_with('/')
            || value.contains('\\')
            || value.split('/').any(|segment| segment == "..");

        if escapes {
            return Err(ConfigError::invalid_value(
                self.field,
                value,
                "a relative path without '..' segments or backslashes",
            ));
        }
        Ok(())
    }
}

/// Accepts an empty extension or one of the form `.ext`
#[derive(Debug, Clone)]
pub struct ExtensionValidator {
    field: &'static str,
}

impl ExtensionValidator {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

impl ConfigValidator<String> for ExtensionValidator {
    fn validate(&self, value: &String) -> Result<(), ConfigError> {
        if value.is_empty() {
            return Ok(());
        }

        let valid = value.starts_with('.')
            && value.len() > 1
            && !value[1..].contains(['.', '/', '\\']);

        if !valid {
            return Err(ConfigError::invalid_value(
                self.field,
                value,
                "an empty string or a single extension such as '.bytes'",
            ));
        }
        Ok(())
    }
}
