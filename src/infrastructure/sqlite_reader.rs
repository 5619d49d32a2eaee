//! `SQLite` database reader for Cursor's state.vscdb files.
//!
//! Reads raw key/value rows from the `cursorDiskKV` table. The database is
//! opened read-only; nothing in this crate writes to it.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};

use crate::domain::{AppError, Result};

/// Raw key-value pair from the database.
#[derive(Debug)]
pub struct RawKvEntry {
    pub key: String,
    pub value: Vec<u8>,
}

/// `SQLite` reader for Cursor state databases.
pub struct StateDbReader {
    conn: Connection,
}

impl StateDbReader {
    /// Opens a state database in read-only mode.
    ///
    /// # Errors
    /// Returns error if the file is missing or cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AppError::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(path, flags).map_err(AppError::database)?;

        // Optimize for read-only access
        conn.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA temp_store = MEMORY;",
        )
        .map_err(AppError::database)?;

        tracing::debug!("Opened state database: {}", path.display());

        Ok(Self { conn })
    }

    /// Streams every row of the KV table through `visit`, one at a time.
    ///
    /// Rows whose columns cannot be read are logged and skipped. Returns the
    /// number of rows skipped that way.
    ///
    /// # Errors
    /// Returns error if the query cannot be prepared, or if stepping the
    /// cursor fails partway through (corrupt file, I/O error, locked store).
    /// No partial result is returned in that case.
    pub fn scan<F>(&self, mut visit: F) -> Result<usize>
    where
        F: FnMut(RawKvEntry),
    {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM cursorDiskKV")
            .map_err(AppError::database)?;

        let mut rows = stmt.query([]).map_err(AppError::database)?;

        let mut unreadable = 0;
        while let Some(row) = rows.next().map_err(AppError::database)? {
            match (row.get::<_, String>(0), value_bytes(row, 1)) {
                (Ok(key), Ok(value)) => visit(RawKvEntry { key, value }),
                (Err(e), _) | (_, Err(e)) => {
                    unreadable += 1;
                    tracing::warn!("Failed to read row: {}", e);
                }
            }
        }

        Ok(unreadable)
    }

    /// Fetches the value stored under exactly `key`.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn fetch_value(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT value FROM cursorDiskKV WHERE key = ?1",
                [key],
                |row| value_bytes(row, 0),
            )
            .optional()
            .map_err(AppError::database)
    }
}

/// Reads a value column stored as either TEXT or BLOB.
fn value_bytes(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<u8>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Blob(b) => b.to_vec(),
        ValueRef::Text(t) => t.to_vec(),
        _ => Vec::new(),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::create_state_db;
    use super::*;
    use rusqlite::params;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let result = StateDbReader::open(&dir.path().join("missing.vscdb"));
        assert!(matches!(result, Err(AppError::DatabaseNotFound { .. })));
    }

    #[test]
    fn test_scan_visits_every_row() {
        let dir = tempdir().unwrap();
        let path = create_state_db(
            dir.path(),
            &[("composerData:a", "{}"), ("inlineDiffsData", "[]")],
        );

        let reader = StateDbReader::open(&path).unwrap();
        let mut keys = Vec::new();
        let unreadable = reader.scan(|entry| keys.push(entry.key)).unwrap();

        keys.sort();
        assert_eq!(unreadable, 0);
        assert_eq!(keys, vec!["composerData:a", "inlineDiffsData"]);
    }

    #[test]
    fn test_scan_skips_row_with_unreadable_key() {
        let dir = tempdir().unwrap();
        let path = create_state_db(dir.path(), &[("composerData:a", "{}")]);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
                params![vec![0_u8, 1, 2], "{}"],
            )
            .unwrap();
        }

        let reader = StateDbReader::open(&path).unwrap();
        let mut keys = Vec::new();
        let unreadable = reader.scan(|entry| keys.push(entry.key)).unwrap();

        assert_eq!(unreadable, 1);
        assert_eq!(keys, vec!["composerData:a"]);
    }

    #[test]
    fn test_scan_fails_on_corrupt_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.vscdb");
        {
            // No key index, so every page past the first belongs to the table.
            let mut conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "PRAGMA page_size = 4096;
                 CREATE TABLE cursorDiskKV (key TEXT, value BLOB);",
            )
            .unwrap();
            let tx = conn.transaction().unwrap();
            let value = "x".repeat(200);
            for i in 0..2000 {
                tx.execute(
                    "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
                    params![format!("composerData:{i}"), value],
                )
                .unwrap();
            }
            tx.commit().unwrap();
        }

        let mut bytes = std::fs::read(&path).unwrap();
        let pages = bytes.len() / 4096;
        assert!(pages > 10);
        let start = (pages / 2) * 4096;
        bytes[start..start + 4096].fill(0xAB);
        std::fs::write(&path, &bytes).unwrap();

        let reader = StateDbReader::open(&path).unwrap();
        let mut visited = 0;
        let result = reader.scan(|_| visited += 1);

        assert!(
            matches!(result, Err(AppError::Database { .. })),
            "scan returned {result:?} after {visited} rows"
        );
    }

    #[test]
    fn test_fetch_value_text_and_blob() {
        let dir = tempdir().unwrap();
        let path = create_state_db(dir.path(), &[("composerData:a", "{\"name\":\"x\"}")]);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
                params!["composerData:b", b"{}".to_vec()],
            )
            .unwrap();
        }

        let reader = StateDbReader::open(&path).unwrap();
        assert_eq!(
            reader.fetch_value("composerData:a").unwrap(),
            Some(b"{\"name\":\"x\"}".to_vec())
        );
        assert_eq!(reader.fetch_value("composerData:b").unwrap(), Some(b"{}".to_vec()));
        assert_eq!(reader.fetch_value("composerData:zzz").unwrap(), None);
    }

    #[test]
    fn test_missing_table_is_query_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.vscdb");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER);")
            .unwrap();

        let reader = StateDbReader::open(&path).unwrap();
        assert!(matches!(reader.scan(|_| {}), Err(AppError::Database { .. })));
    }
}
