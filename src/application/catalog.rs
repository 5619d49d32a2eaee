//! Session catalog.
//!
//! Scans the KV table once, decodes and filters every record, and collects
//! the surviving sessions in start-time order.

use serde::Serialize;

use crate::domain::{
    is_listable, is_valid, should_skip_raw, AppError, CatalogStats, Conversation,
    ExportDescriptor, Result, SessionSummary, TimeRange,
};
use crate::infrastructure::{RawKvEntry, StateDbReader};

use super::parser::decode_record;

/// Direction of the start-time ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

impl SortOrder {
    /// Descending when `desc` is set, ascending otherwise.
    #[must_use]
    pub const fn from_desc(desc: bool) -> Self {
        if desc {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

/// Session listing, serialized as-is in `--json` mode.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListReport {
    pub sessions: Vec<SessionSummary>,
    pub total: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ListReport {
    /// Report for a completed listing.
    #[must_use]
    pub fn completed(sessions: Vec<SessionSummary>) -> Self {
        Self {
            total: sessions.len(),
            sessions,
            success: true,
            error: None,
        }
    }

    /// Report for a listing that failed as a whole.
    #[must_use]
    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            ..Self::default()
        }
    }
}

/// Lists every valid session, oldest first. Untitled sessions keep a blank title.
///
/// # Errors
/// Returns error if the store cannot be queried.
pub fn list_sessions(reader: &StateDbReader) -> Result<(Vec<SessionSummary>, CatalogStats)> {
    let (mut sessions, stats) = scan_catalog(
        reader,
        &TimeRange::default(),
        is_listable,
        SessionSummary::new,
    )?;
    sessions.sort_by_key(|s| s.start_time);
    Ok((sessions, stats))
}

/// Collects the sessions to export, filtered by `range` and sorted by `order`.
///
/// # Errors
/// Returns error if the store cannot be queried.
pub fn collect_exports(
    reader: &StateDbReader,
    range: &TimeRange,
    order: SortOrder,
) -> Result<(Vec<ExportDescriptor>, CatalogStats)> {
    let (mut items, stats) = scan_catalog(reader, range, is_valid, ExportDescriptor::new)?;
    match order {
        SortOrder::Ascending => items.sort_by_key(|d| d.start_time),
        SortOrder::Descending => items.sort_by(|a, b| b.start_time.cmp(&a.start_time)),
    }
    Ok((items, stats))
}

/// Runs the skip/decode/validate/range pipeline over every row.
fn scan_catalog<T, F>(
    reader: &StateDbReader,
    range: &TimeRange,
    valid: fn(&Conversation) -> bool,
    project: F,
) -> Result<(Vec<T>, CatalogStats)>
where
    F: Fn(&str, &Conversation) -> T,
{
    let mut stats = CatalogStats::default();
    let mut items = Vec::new();

    let unreadable = reader.scan(|entry| {
        stats.rows_scanned += 1;
        if let Some(conv) = accept_entry(&entry, range, valid, &mut stats) {
            items.push(project(&entry.key, &conv));
        }
    })?;

    stats.accepted = items.len();

    tracing::info!(
        "Scanned {} rows: {} sessions, {} sentinel, {} undecodable, {} invalid, {} out of range, {} unreadable",
        stats.rows_scanned,
        stats.accepted,
        stats.sentinel_skipped,
        stats.decode_failures,
        stats.invalid,
        stats.out_of_range,
        unreadable
    );

    Ok((items, stats))
}

/// Decodes one row and returns the conversation if it passes every filter.
fn accept_entry(
    entry: &RawKvEntry,
    range: &TimeRange,
    valid: fn(&Conversation) -> bool,
    stats: &mut CatalogStats,
) -> Option<Conversation> {
    if should_skip_raw(&entry.key, &entry.value) {
        stats.sentinel_skipped += 1;
        tracing::trace!("Skipping sentinel row: {}", entry.key);
        return None;
    }

    let conv = match decode_record(&entry.key, &entry.value) {
        Ok(conv) => conv,
        Err(e) => {
            stats.decode_failures += 1;
            tracing::debug!("{}", e);
            return None;
        }
    };

    if !valid(&conv) {
        stats.invalid += 1;
        tracing::debug!("Skipping empty or internal record: {}", entry.key);
        return None;
    }

    if !range.contains(&conv) {
        stats.out_of_range += 1;
        return None;
    }

    Some(conv)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{chat_json, local_noon};
    use super::*;
    use crate::domain::filter::parse_time_arg;
    use crate::infrastructure::sqlite_reader::test_support::create_state_db;
    use tempfile::tempdir;

    #[test]
    fn test_list_skips_sentinels_and_strips_prefix() {
        let dir = tempdir().unwrap();
        let abc = chat_json("First chat", local_noon(2024, 1, 5));
        let path = create_state_db(
            dir.path(),
            &[
                ("composerData:abc", abc.as_str()),
                ("inlineDiffsData", "[]"),
                ("composerData:empty", "[]"),
            ],
        );

        let reader = StateDbReader::open(&path).unwrap();
        let (sessions, stats) = list_sessions(&reader).unwrap();

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "abc");
        assert_eq!(sessions[0].title, "First chat");
        assert!(sessions[0].end_time.is_some());
        assert_eq!(stats.rows_scanned, 3);
        assert_eq!(stats.sentinel_skipped, 2);
    }

    #[test]
    fn test_list_skips_bad_records_and_continues() {
        let dir = tempdir().unwrap();
        let good = chat_json("Good", local_noon(2024, 3, 1));
        let untitled = chat_json("", local_noon(2024, 3, 2));
        let path = create_state_db(
            dir.path(),
            &[
                ("composerData:good", good.as_str()),
                ("composerData:broken", "{\"name\": "),
                ("composerData:untitled", untitled.as_str()),
                ("composerData:blank", r#"{"name": "x", "conversation": [{"type": 1, "text": ""}]}"#),
                ("composerData:none", r#"{"name": "x", "conversation": []}"#),
            ],
        );

        let reader = StateDbReader::open(&path).unwrap();
        let (sessions, stats) = list_sessions(&reader).unwrap();

        assert_eq!(
            sessions.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
            vec!["good", "untitled"]
        );
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.invalid, 2);
    }

    #[test]
    fn test_untitled_session_listed_with_blank_title() {
        let dir = tempdir().unwrap();
        let untitled = chat_json("", local_noon(2024, 3, 2));
        let path = create_state_db(dir.path(), &[("composerData:abc", untitled.as_str())]);
        let reader = StateDbReader::open(&path).unwrap();

        let (sessions, _) = list_sessions(&reader).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "abc");
        assert_eq!(sessions[0].title, "");

        let (exports, stats) =
            collect_exports(&reader, &TimeRange::default(), SortOrder::Descending).unwrap();
        assert!(exports.is_empty());
        assert_eq!(stats.invalid, 1);
    }

    #[test]
    fn test_list_sorted_ascending() {
        let dir = tempdir().unwrap();
        let newer = chat_json("Newer", local_noon(2024, 5, 1));
        let older = chat_json("Older", local_noon(2023, 5, 1));
        let path = create_state_db(
            dir.path(),
            &[
                ("composerData:n", newer.as_str()),
                ("composerData:o", older.as_str()),
            ],
        );

        let reader = StateDbReader::open(&path).unwrap();
        let (sessions, _) = list_sessions(&reader).unwrap();
        assert_eq!(sessions[0].title, "Older");
        assert_eq!(sessions[1].title, "Newer");
    }

    #[test]
    fn test_collect_exports_filters_and_orders() {
        let dir = tempdir().unwrap();
        let jan = chat_json("January", local_noon(2024, 1, 5));
        let jan_late = chat_json("Late January", local_noon(2024, 1, 20));
        let mar = chat_json("March", local_noon(2024, 3, 5));
        let path = create_state_db(
            dir.path(),
            &[
                ("composerData:a", jan.as_str()),
                ("composerData:b", jan_late.as_str()),
                ("composerData:c", mar.as_str()),
            ],
        );
        let reader = StateDbReader::open(&path).unwrap();

        let range = TimeRange {
            start_after: Some(parse_time_arg("2024-01-01").unwrap()),
            start_before: Some(parse_time_arg("2024-02-01").unwrap()),
            ..TimeRange::default()
        };

        let (desc, stats) = collect_exports(&reader, &range, SortOrder::Descending).unwrap();
        assert_eq!(desc.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(stats.out_of_range, 1);
        assert!(desc.iter().all(|d| d.output_path.is_none()));
        assert_eq!(desc[0].key, "composerData:b");

        let (asc, _) = collect_exports(&reader, &range, SortOrder::Ascending).unwrap();
        assert_eq!(asc.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_list_report_json() {
        let dir = tempdir().unwrap();
        let abc = chat_json("First chat", local_noon(2024, 1, 5));
        let path = create_state_db(dir.path(), &[("composerData:abc", abc.as_str())]);
        let reader = StateDbReader::open(&path).unwrap();

        let (sessions, _) = list_sessions(&reader).unwrap();
        let json = serde_json::to_value(ListReport::completed(sessions)).unwrap();

        assert_eq!(json["total"], 1);
        assert_eq!(json["success"], true);
        assert_eq!(json["sessions"][0]["id"], "abc");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_sort_order_from_flag() {
        assert_eq!(SortOrder::from_desc(true), SortOrder::Descending);
        assert_eq!(SortOrder::from_desc(false), SortOrder::Ascending);
        assert_eq!(SortOrder::default(), SortOrder::Descending);
    }
}
