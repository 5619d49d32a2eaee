//! Cursor IDE path discovery.
//!
//! Locates the global `state.vscdb` that holds chat sessions.

use std::path::{Path, PathBuf};

use crate::domain::{AppError, Result};

/// Cursor's directory under the platform config dir.
const CURSOR_DIR: &str = "Cursor";
/// Subdirectory containing the global state database.
const GLOBAL_STORAGE_PATH: &str = "User/globalStorage";
const STATE_DB_NAME: &str = "state.vscdb";

/// Returns the default global state database path for this platform.
///
/// `%APPDATA%` on Windows, `~/Library/Application Support` on macOS and
/// `~/.config` on Linux.
///
/// # Errors
/// Returns error if the platform config directory cannot be determined.
pub fn default_state_db_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| AppError::Config {
        message: "Could not determine the default database path".into(),
    })?;

    let path = state_db_under(&config_dir);
    tracing::debug!("Default state DB: {}", path.display());
    Ok(path)
}

/// Resolves the database path: explicit CLI value, then config, then default.
///
/// # Errors
/// Returns error if no explicit path is given and the default cannot be determined.
pub fn resolve_db_path(cli: Option<&Path>, configured: Option<&Path>) -> Result<PathBuf> {
    match cli.or(configured) {
        Some(path) => Ok(path.to_path_buf()),
        None => default_state_db_path(),
    }
}

fn state_db_under(config_dir: &Path) -> PathBuf {
    config_dir
        .join(CURSOR_DIR)
        .join(GLOBAL_STORAGE_PATH)
        .join(STATE_DB_NAME)
}
