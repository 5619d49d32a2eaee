//! Infrastructure layer - external adapters (database, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod cursor_paths;
pub mod output;
pub mod sqlite_reader;

pub use config::load_config;
pub use cursor_paths::resolve_db_path;
pub use output::{ensure_output_dir, write_document};
pub use sqlite_reader::{RawKvEntry, StateDbReader};
