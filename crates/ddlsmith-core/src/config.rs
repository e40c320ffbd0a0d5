//! Configuration schema (ddlsmith.toml)

use serde::{Deserialize, Serialize};
use crate::registry::TypeRegistry;

/// SQL dialect used to validate generated DDL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectConfig {
    /// Snowflake SQL dialect
    Snowflake,

    /// Generic ANSI SQL
    Ansi,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::Snowflake
    }
}

/// Warehouse connection settings
///
/// Secrets are never read from the file; see [`ConnectionConfig::PASSWORD_ENV`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Account locator, e.g. `xy12345.us-east-1`
    pub account: String,

    /// Login name
    pub user: String,

    /// Warehouse for the session
    #[serde(default)]
    pub warehouse: Option<String>,

    /// Role for the session
    #[serde(default)]
    pub role: Option<String>,

    /// Default database
    #[serde(default)]
    pub database: Option<String>,
}

impl ConnectionConfig {
    /// Environment variable holding the password
    pub const PASSWORD_ENV: &'static str = "DDLSMITH_PASSWORD";

    /// Environment variable holding a PEM private key
    pub const PRIVATE_KEY_ENV: &'static str = "DDLSMITH_PRIVATE_KEY";
}

/// Values used when generating new objects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Target lag for new dynamic tables
    #[serde(default)]
    pub target_lag: Option<String>,

    /// Warehouse for new dynamic tables
    #[serde(default)]
    pub warehouse: Option<String>,
}

fn default_excluded_schemas() -> Vec<String> {
    vec!["INFORMATION_SCHEMA".to_string(), "PUBLIC".to_string()]
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQL dialect
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Schemas hidden from schema listings
    #[serde(default = "default_excluded_schemas")]
    pub excluded_schemas: Vec<String>,

    /// Types offered in addition to the base types
    #[serde(default)]
    pub extra_types: Vec<String>,

    /// Generation defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Warehouse connection
    #[serde(default)]
    pub connection: Option<ConnectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: DialectConfig::default(),
            excluded_schemas: default_excluded_schemas(),
            extra_types: Vec::new(),
            defaults: DefaultsConfig::default(),
            connection: None,
        }
    }
}

impl Config {
    /// Default config file name
    pub const FILE_NAME: &'static str = "ddlsmith.toml";

    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Whether a schema should be hidden from listings
    pub fn is_schema_excluded(&self, schema: &str) -> bool {
        self.excluded_schemas
            .iter()
            .any(|s| s.eq_ignore_ascii_case(schema))
    }

    /// Type registry seeded with the base types and `extra_types`
    pub fn type_registry(&self) -> TypeRegistry {
        TypeRegistry::with_types(&self.extra_types)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
