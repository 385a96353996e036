//! Loading configuration from strings and files

use crate::config::EngineConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::debug;

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    #[cfg(feature = "toml")]
    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, picking the format from its extension
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        debug!(path = %path.display(), format = %extension, "Loading engine config");

        match extension.as_str() {
            "json" => Self::from_json_str(&contents),
            #[cfg(feature = "toml")]
            "toml" => Self::from_toml_str(&contents),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"dialect": {"string_size": 255}}"#).unwrap();

        assert_eq!(config.dialect.string_size, 255);
        assert_eq!(config.dialect.charset, "utf8mb4");
        assert_eq!(config.mapping.tag_name, "sqlike");
    }

    #[test]
    fn test_toml_sections() {
        let config = EngineConfig::from_toml_str(
            r#"
            [mapping]
            tag_name = "db"

            [json]
            legacy_float = true
            "#,
        )
        .unwrap();

        assert_eq!(config.mapping.tag_name, "db");
        assert!(config.json.legacy_float);
        assert_eq!(config.dialect.driver, "mysql");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = EngineConfig::from_json_str(r#"{"dialect": {"driver": ""}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test_case("engine.toml", "[mapping]\ntag_name = \"col\"\n" ; "toml file")]
    #[test_case("engine.json", "{\"mapping\": {\"tag_name\": \"col\"}}" ; "json file")]
    fn test_load_by_extension(name: &str, body: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.mapping.tag_name, "col");
    }

    #[test]
    fn test_load_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ini");
        std::fs::write(&path, "tag_name=x").unwrap();

        let result = EngineConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ext)) if ext == "ini"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
