//! Filesystem output for exported documents.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::domain::{AppError, Result};

/// Creates the output directory (and parents) if absent.
///
/// # Errors
/// Returns error if the directory cannot be created.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::io(format!("Failed to create directory {}", dir.display()), e)
    })
}

/// Writes a whole document, replacing any existing file.
///
/// # Errors
/// Returns error if the file cannot be created or fully written.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create {}", path.display()), e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;
    file.flush()
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_into_new_dir() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        ensure_output_dir(&out).unwrap();

        let path = out.join("doc.md");
        write_document(&path, "# hi\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# hi\n");

        write_document(&path, "# again\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# again\n");
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("doc.md");
        assert!(matches!(write_document(&path, "x"), Err(AppError::Io { .. })));
    }
}
