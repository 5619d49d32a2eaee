//! Configuration file loading.
//!
//! Reads the optional TOML config; a missing file means defaults.

use std::fs;
use std::path::Path;

use crate::domain::{AppConfig, AppError, Result};

/// Documented example of the configuration file.
#[cfg(test)]
const EXAMPLE_CONFIG: &str = r#"# cursor-md-export configuration

[store]
# Path to Cursor's state.vscdb (defaults to the platform location)
# db_path = "/path/to/state.vscdb"

[export]
# Directory for exported Markdown files
output_dir = "markdown_output"

# Sort batch exports newest first
sort_desc = true

# Name files by title instead of by sequence number
by_name = false
"#;

/// Load configuration from `path`, or from the default location.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = path.map_or_else(AppConfig::default_config_path, Path::to_path_buf);

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    let config = toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })?;

    tracing::debug!(path = %path.display(), "Loaded configuration");

    Ok(config)
}
