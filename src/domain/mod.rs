//! Domain layer - core types, filters and error types.
//!
//! This layer contains pure domain models and rules
//! without any external dependencies (DB, IO, etc.).

pub mod config;
pub mod error;
pub mod filter;
pub mod models;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use filter::{is_listable, is_valid, should_skip_raw, TimeRange};
pub use models::{
    key_for_session, CatalogStats, CodeBlock, Conversation, ExportDescriptor, Role,
    SessionSummary, Snippet, Turn,
};
