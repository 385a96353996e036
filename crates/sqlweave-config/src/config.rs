//! Engine configuration structs
//!
//! Every section is optional in the source document; missing sections and
//! fields fall back to their `Default` impls.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Top-level engine configuration
///
/// # Example TOML
///
/// ```toml
/// [mapping]
/// tag_name = "sqlike"
///
/// [dialect]
/// driver = "mysql"
/// string_size = 191
/// charset = "utf8mb4"
/// collate = "utf8mb4_unicode_ci"
///
/// [json]
/// legacy_float = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Field indexer settings
    pub mapping: MappingConfig,
    /// Statement compiler settings
    pub dialect: DialectConfig,
    /// JSON codec settings
    pub json: JsonConfig,
}

/// Field indexer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Struct tag namespace read by the field indexer
    pub tag_name: String,
}

/// Dialect configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    /// Driver name used to pick the dialect from the registry
    pub driver: String,
    /// Default VARCHAR length for string columns without a `size` tag
    pub string_size: u32,
    /// Default character set for string columns
    pub charset: String,
    /// Default collation for string columns
    pub collate: String,
    /// Whether index DDL may carry `DESC` column directions
    pub supports_desc_index: bool,
    /// Row limit applied by façades when a find has none
    pub default_limit: u64,
}

/// JSON codec configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
    /// Render every non-positive float as a bare `0`
    pub legacy_float: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            tag_name: "sqlike".to_string(),
        }
    }
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            driver: "mysql".to_string(),
            string_size: 191,
            charset: "utf8mb4".to_string(),
            collate: "utf8mb4_unicode_ci".to_string(),
            supports_desc_index: true,
            default_limit: 100,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Check values that deserialize fine but cannot drive the engine
    pub fn validate(&self) -> ConfigResult<()> {
        if self.mapping.tag_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "mapping.tag_name",
                message: "tag name must not be empty".to_string(),
            });
        }
        if self.dialect.driver.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "dialect.driver",
                message: "driver must not be empty".to_string(),
            });
        }
        if self.dialect.string_size == 0 {
            return Err(ConfigError::Invalid {
                field: "dialect.string_size",
                message: "string size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.mapping.tag_name, "sqlike");
        assert_eq!(config.dialect.driver, "mysql");
        assert_eq!(config.dialect.string_size, 191);
        assert!(config.dialect.supports_desc_index);
        assert!(!config.json.legacy_float);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_tag() {
        let mut config = EngineConfig::default();
        config.mapping.tag_name = "  ".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "mapping.tag_name",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_zero_string_size() {
        let mut config = EngineConfig::default();
        config.dialect.string_size = 0;

        assert!(config.validate().is_err());
    }
}
