//! Export orchestration.
//!
//! Composes the catalog, decoder, renderer and naming policy into single
//! and batch exports. Per-session failures in a batch are logged and
//! counted; only store or output-directory failures abort the run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{
    is_valid, key_for_session, AppError, Conversation, ExportDescriptor, Result, TimeRange,
};
use crate::infrastructure::{ensure_output_dir, write_document, StateDbReader};

use super::catalog::{collect_exports, SortOrder};
use super::formatter::render_markdown;
use super::naming::{resolve_collision, sequence_file_name, title_file_name, NamingPolicy};
use super::parser::decode_record;

/// Options shared by single and batch export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory for the Markdown files; created if absent.
    pub output_dir: PathBuf,
    /// Only applies to batch export.
    pub time_range: TimeRange,
    pub order: SortOrder,
    pub naming: NamingPolicy,
}

/// Outcome of an export, serialized as-is in `--json` mode.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    /// Written sessions in export order.
    pub sessions: Vec<ExportDescriptor>,
    /// Number of documents written.
    pub total: usize,
    /// Sessions selected but not written.
    pub failed: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportReport {
    fn completed(sessions: Vec<ExportDescriptor>, failed: usize) -> Self {
        Self {
            total: sessions.len(),
            sessions,
            failed,
            success: true,
            error: None,
        }
    }

    /// Report for an operation that failed as a whole.
    #[must_use]
    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            ..Self::default()
        }
    }
}

/// Exports exactly one session, looked up by identifier.
///
/// The file is named by title and overwrites an existing file of that name.
///
/// # Errors
/// Returns `SessionNotFound` if no record exists for `id`, a decode or
/// `InvalidData` error if the record is not an exportable conversation, and
/// IO errors if the document cannot be written.
pub fn export_session(
    reader: &StateDbReader,
    id: &str,
    options: &ExportOptions,
) -> Result<ExportReport> {
    let key = key_for_session(id);
    let data = reader
        .fetch_value(&key)?
        .ok_or_else(|| AppError::SessionNotFound { id: id.to_string() })?;

    let conv = decode_record(&key, &data)?;
    if !is_valid(&conv) {
        return Err(AppError::InvalidData {
            message: format!("Session {id} has no exportable conversation"),
        });
    }

    ensure_output_dir(&options.output_dir)?;

    let path = options.output_dir.join(title_file_name(&conv.title));
    let mut desc = ExportDescriptor::new(&key, &conv);
    write_conversation(&conv, &path)?;
    desc.output_path = Some(path);

    Ok(ExportReport::completed(vec![desc], 0))
}

/// Exports every session in the time range, in the requested order.
///
/// # Errors
/// Returns error if the store cannot be queried or the output directory
/// cannot be created. Failures of individual sessions are not errors.
pub fn export_all(reader: &StateDbReader, options: &ExportOptions) -> Result<ExportReport> {
    let (items, _) = collect_exports(reader, &options.time_range, options.order)?;

    ensure_output_dir(&options.output_dir)?;

    let total = items.len();
    let mut written = Vec::with_capacity(total);
    let mut failed = 0;

    for (index, mut desc) in items.into_iter().enumerate() {
        match export_item(reader, &desc, index, total, options) {
            Ok(path) => {
                desc.output_path = Some(path);
                written.push(desc);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("Failed to export {}: {}", desc.id, e);
            }
        }
    }

    tracing::info!("Exported {} of {} sessions", written.len(), total);

    Ok(ExportReport::completed(written, failed))
}

/// Re-fetches, renders and writes one catalogued session.
fn export_item(
    reader: &StateDbReader,
    desc: &ExportDescriptor,
    index: usize,
    total: usize,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let data = reader
        .fetch_value(&desc.key)?
        .ok_or_else(|| AppError::SessionNotFound {
            id: desc.id.clone(),
        })?;
    let conv = decode_record(&desc.key, &data)?;

    let path = match options.naming {
        NamingPolicy::BySequence => options
            .output_dir
            .join(sequence_file_name(total, index, &conv.title)),
        NamingPolicy::ByTitle => resolve_collision(
            &options.output_dir,
            &title_file_name(&conv.title),
            desc.start_time,
        ),
    };

    write_conversation(&conv, &path)?;
    Ok(path)
}

fn write_conversation(conv: &Conversation, path: &Path) -> Result<()> {
    write_document(path, &render_markdown(conv))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
