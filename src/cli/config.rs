//! Configuration file
//!
//! ```json
//! {
//!   "table": {"name": "users", "hash_key": "id", "indexes": [...]},
//!   "log_level": "info",
//!   "placeholder_offset": 0
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::Severity;
use crate::planner::TableDescriptor;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Index catalog of the target table (required)
    pub table: TableDescriptor,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// First placeholder index (optional, default 0)
    #[serde(default)]
    pub placeholder_offset: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.log_severity()?;

        self.table
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn log_severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(|_| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn or error.",
                self.log_level
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_with_defaults() {
        let file = write_config(r#"{"table": {"name": "users", "hash_key": "id"}}"#);
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.table.name, "users");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.placeholder_offset, 0);
        assert_eq!(config.log_severity().unwrap(), Severity::Info);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let file = write_config(
            r#"{"table": {"name": "users", "hash_key": "id"}, "log_level": "loud"}"#,
        );
        let err = Config::load(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "AERO_CLI_CONFIG_ERROR");
        assert!(err.message().contains("loud"));
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        let file = write_config(
            r#"{"table": {"name": "users", "hash_key": "id",
                "indexes": [{"name": "a", "hash_attribute": "x"},
                            {"name": "a", "hash_attribute": "y"}]}}"#,
        );
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.message().contains("AERO_INVALID_CATALOG"));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/aeroquery.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
