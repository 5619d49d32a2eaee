//! Application configuration model.
//!
//! Every field has a default so a missing or partial config file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default directory for exported Markdown files.
pub const DEFAULT_OUTPUT_DIR: &str = "markdown_output";

/// Where to read chat data from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Explicit path to `state.vscdb`; platform default when unset.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Defaults for the `export` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for exported files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Sort batch exports newest first.
    #[serde(default = "default_sort_desc")]
    pub sort_desc: bool,

    /// Name files by title instead of by sequence number.
    #[serde(default)]
    pub by_name: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            sort_desc: default_sort_desc(),
            by_name: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

const fn default_sort_desc() -> bool {
    true
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    /// Get the default directory holding the config file.
    #[must_use]
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cursor-md-export")
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.store.db_path.is_none());
        assert_eq!(config.export.output_dir, PathBuf::from("markdown_output"));
        assert!(config.export.sort_desc);
        assert!(!config.export.by_name);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AppConfig = toml::from_str("[export]\nby_name = true\n").unwrap();
        assert!(config.export.by_name);
        assert!(config.export.sort_desc);
        assert_eq!(config.export.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }
}
