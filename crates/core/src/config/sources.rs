use std::fmt;

/// Origin of a resolved configuration field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from the named `AUTOCREATE_*` variable
    EnvVar(String),
    /// Variable unset, built-in default used
    Default(String),
}

impl ConfigSource {
    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvVar(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::EnvVar(var) => write!(f, "env {}", var),
            ConfigSource::Default(value) => write!(f, "default '{}'", value),
        }
    }
}
