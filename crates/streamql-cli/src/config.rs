//! Configuration file support for StreamQL
//!
//! Supports both YAML and TOML configuration files.
//!
//! # Example YAML configuration:
//! ```yaml
//! # Event types queries may select from
//! event_types:
//!   - name: LogEvent
//!     fields:
//!       - { name: Level, type: int }
//!       - { name: Latency, type: float }
//!       - { name: Message, type: str }
//!
//! # Logging settings
//! logging:
//!   level: info
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use streamql_core::{EventType, FieldType, Registry, SchemaError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Event type schemas registered before any query is compiled
    pub event_types: Vec<EventType>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML, auto-detected by extension)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "toml" => Self::from_toml(&content),
            _ => Self::from_yaml(&content).or_else(|_| Self::from_toml(&content)),
        }
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the configured schemas and build a registry from them.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::new();
        for event_type in &self.event_types {
            event_type.validate()?;
            if registry.contains(&event_type.name) {
                return Err(ConfigError::DuplicateEventType(event_type.name.clone()));
            }
            registry.register(event_type.clone());
        }
        Ok(registry)
    }

    /// Create an example configuration
    pub fn example() -> Self {
        Self {
            event_types: vec![
                EventType::new("LogEvent")
                    .with_field("Level", FieldType::Int)
                    .with_field("Latency", FieldType::Float)
                    .with_field("Message", FieldType::Str),
                EventType::new("MyEvent")
                    .with_field("Name", FieldType::Str)
                    .with_field("Value", FieldType::Int),
            ],
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    /// Generate example YAML configuration
    pub fn example_yaml() -> String {
        serde_yaml::to_string(&Self::example()).unwrap_or_default()
    }

    /// Generate example TOML configuration
    pub fn example_toml() -> String {
        toml::to_string_pretty(&Self::example()).unwrap_or_default()
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    IoError(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid event type: {0}")]
    InvalidSchema(#[from] SchemaError),

    #[error("Event type '{0}' is declared more than once")]
    DuplicateEventType(String),
}
