//! Output file naming.
//!
//! Files are named either by title or by position in the export order.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Characters that are not allowed in file names on common filesystems.
const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const FALLBACK_NAME: &str = "untitled";
const EXTENSION: &str = "md";

/// How batch exports name their files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingPolicy {
    /// `<NN>-<title>.md`, numbered by position in the sorted output.
    #[default]
    BySequence,
    /// `<title>.md`, with a timestamp suffix when the file already exists.
    ByTitle,
}

/// Replaces reserved characters with `_`; blank titles become `untitled`.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();

    if sanitized.trim().is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        sanitized
    }
}

/// File name for by-title naming.
#[must_use]
pub fn title_file_name(title: &str) -> String {
    format!("{}.{EXTENSION}", sanitize_title(title))
}

/// File name for by-sequence naming.
///
/// The number is `index + 1`, zero-padded to the digit count of `total`.
#[must_use]
pub fn sequence_file_name(total: usize, index: usize, title: &str) -> String {
    let width = total.to_string().len();
    format!(
        "{:0width$}-{}.{EXTENSION}",
        index + 1,
        sanitize_title(title)
    )
}

/// Returns `dir/file_name`, or a start-time-suffixed variant if it exists.
///
/// The check is not atomic; a concurrent writer can still race us.
#[must_use]
pub fn resolve_collision(dir: &Path, file_name: &str, start_time: DateTime<Local>) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = Path::new(file_name)
        .file_stem()
        .map_or_else(|| FALLBACK_NAME.into(), |s| s.to_string_lossy().into_owned());
    let suffixed = format!(
        "{stem}-{}.{EXTENSION}",
        start_time.format("%Y%m%d-%H%M%S")
    );

    tracing::debug!(
        "{} exists, writing {} instead",
        candidate.display(),
        suffixed
    );
    dir.join(suffixed)
}
