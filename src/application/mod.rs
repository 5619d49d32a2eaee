//! Application layer - use cases and orchestration.
//!
//! This layer contains the extraction, filtering, rendering and export
//! logic built on top of the domain types.

pub mod catalog;
pub mod exporter;
pub mod formatter;
pub mod naming;
pub mod parser;

pub use catalog::{list_sessions, ListReport, SortOrder};
pub use exporter::{export_all, export_session, ExportOptions, ExportReport};
pub use formatter::{
    format_export_line, format_export_summary, format_session_count, format_sessions_table,
};
pub use naming::NamingPolicy;
