//! Record filters: sentinel rows, conversation validity and time ranges.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use super::error::{AppError, Result};
use super::models::{Conversation, COMPOSER_KEY_PREFIX};

/// Value Cursor stores for empty records.
const EMPTY_VALUE_SENTINEL: &[u8] = b"[]";
/// Scratch key that never holds a conversation.
const INLINE_DIFFS_KEY: &str = "inlineDiffsData";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether a raw row must be skipped before decoding.
#[must_use]
pub fn should_skip_raw(key: &str, value: &[u8]) -> bool {
    value == EMPTY_VALUE_SENTINEL || key == INLINE_DIFFS_KEY
}

/// Whether a decoded record is a real, non-empty conversation to export.
///
/// Untitled records fall back to their store key as title, so they are
/// rejected by the prefix rule as well.
#[must_use]
pub fn is_valid(conv: &Conversation) -> bool {
    has_valid_content(&conv.title, conv)
}

/// Whether a decoded record belongs in the session listing.
///
/// Checks the name as stored, so untitled sessions are listed.
#[must_use]
pub fn is_listable(conv: &Conversation) -> bool {
    has_valid_content(&conv.name, conv)
}

fn has_valid_content(title: &str, conv: &Conversation) -> bool {
    if title.starts_with(COMPOSER_KEY_PREFIX) {
        return false;
    }

    if conv.turns.is_empty() {
        return false;
    }

    conv.has_written_content()
}

/// Optional inclusive bounds on session start and end times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start_after: Option<DateTime<Local>>,
    pub start_before: Option<DateTime<Local>>,
    pub end_after: Option<DateTime<Local>>,
    pub end_before: Option<DateTime<Local>>,
}

impl TimeRange {
    /// Builds a range from raw CLI arguments.
    ///
    /// # Errors
    /// Returns `InvalidTime` for the first argument that does not parse.
    pub fn from_args(
        start_after: Option<&str>,
        start_before: Option<&str>,
        end_after: Option<&str>,
        end_before: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            start_after: start_after.map(parse_time_arg).transpose()?,
            start_before: start_before.map(parse_time_arg).transpose()?,
            end_after: end_after.map(parse_time_arg).transpose()?,
            end_before: end_before.map(parse_time_arg).transpose()?,
        })
    }

    /// Whether no bound is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_after.is_none()
            && self.start_before.is_none()
            && self.end_after.is_none()
            && self.end_before.is_none()
    }

    /// Whether a conversation falls inside the range.
    ///
    /// End bounds are only checked when the conversation has an end time.
    #[must_use]
    pub fn contains(&self, conv: &Conversation) -> bool {
        if self.is_empty() {
            return true;
        }

        let start = conv.start_time();
        if let Some(bound) = self.start_after {
            if start < bound {
                log_rejection(&conv.title, "start", start, "before", bound);
                return false;
            }
        }
        if let Some(bound) = self.start_before {
            if start > bound {
                log_rejection(&conv.title, "start", start, "after", bound);
                return false;
            }
        }

        if let Some(end) = conv.end_time() {
            if let Some(bound) = self.end_after {
                if end < bound {
                    log_rejection(&conv.title, "end", end, "before", bound);
                    return false;
                }
            }
            if let Some(bound) = self.end_before {
                if end > bound {
                    log_rejection(&conv.title, "end", end, "after", bound);
                    return false;
                }
            }
        }

        true
    }
}

fn log_rejection(
    title: &str,
    which: &str,
    time: DateTime<Local>,
    relation: &str,
    bound: DateTime<Local>,
) {
    tracing::debug!(
        "Skipping '{}': {} time {} is {} {}",
        title,
        which,
        time.format(DISPLAY_FORMAT),
        relation,
        bound.format(DISPLAY_FORMAT)
    );
}

/// Parses a time argument in the local timezone.
///
/// Accepted formats, tried in order: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`,
/// `YYYY-MM-DD HH:MM:SS`.
///
/// # Errors
/// Returns `InvalidTime` if no format matches or the local time does not exist.
pub fn parse_time_arg(value: &str) -> Result<DateTime<Local>> {
    let trimmed = value.trim();
    let invalid = || AppError::InvalidTime {
        value: value.to_string(),
    };

    let naive = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M").ok())
        .or_else(|| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").ok())
        .ok_or_else(invalid)?;

    Local.from_local_datetime(&naive).earliest().ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Role, Turn};

    fn local_millis(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn conversation(title: &str, texts: &[&str]) -> Conversation {
        Conversation {
            name: title.to_string(),
            title: title.to_string(),
            turns: texts
                .iter()
                .map(|t| Turn {
                    role: Role::User,
                    text: (*t).to_string(),
                    ..Turn::default()
                })
                .collect(),
            ..Conversation::default()
        }
    }

    #[test]
    fn test_sentinel_rows_skipped() {
        assert!(should_skip_raw("composerData:x", b"[]"));
        assert!(should_skip_raw("inlineDiffsData", b"{\"name\":\"x\"}"));
        assert!(!should_skip_raw("composerData:x", b"[ ]"));
        assert!(!should_skip_raw("composerData:x", b"{}"));
    }

    #[test]
    fn test_is_valid_rules() {
        assert!(is_valid(&conversation("Fix bug", &["hello"])));
        assert!(is_valid(&conversation("Fix bug", &["", "later"])));

        assert!(!is_valid(&conversation("Fix bug", &[])));
        assert!(!is_valid(&conversation("Fix bug", &["", ""])));
        assert!(!is_valid(&conversation("composerData:abc", &["hello"])));
    }

    #[test]
    fn test_untitled_listed_but_not_exported() {
        let conv = Conversation {
            name: String::new(),
            ..conversation("composerData:abc", &["hello"])
        };
        assert!(is_listable(&conv));
        assert!(!is_valid(&conv));

        assert!(!is_listable(&conversation("composerData:abc", &["hello"])));
        assert!(!is_listable(&Conversation {
            name: String::new(),
            ..conversation("composerData:abc", &["", ""])
        }));
    }

    #[test]
    fn test_empty_range_accepts_everything() {
        let range = TimeRange::default();
        assert!(range.is_empty());
        assert!(range.contains(&Conversation::default()));
    }

    #[test]
    fn test_start_bounds_are_inclusive() {
        let start = local_millis(2024, 1, 5, 12);
        let conv = Conversation {
            created_at_millis: start,
            ..conversation("t", &["x"])
        };
        let exact = millis_to_bound(start);

        let range = TimeRange {
            start_after: Some(exact),
            start_before: Some(exact),
            ..TimeRange::default()
        };
        assert!(range.contains(&conv));

        let later = TimeRange {
            start_after: Some(parse_time_arg("2024-02-01").unwrap()),
            ..TimeRange::default()
        };
        assert!(!later.contains(&conv));

        let earlier = TimeRange {
            start_before: Some(parse_time_arg("2024-01-01").unwrap()),
            ..TimeRange::default()
        };
        assert!(!earlier.contains(&conv));
    }

    #[test]
    fn test_open_session_ignores_end_bounds() {
        let conv = Conversation {
            created_at_millis: local_millis(2024, 1, 5, 12),
            ..conversation("t", &["x"])
        };
        assert!(conv.end_time().is_none());

        let range = TimeRange {
            end_after: Some(parse_time_arg("2030-01-01").unwrap()),
            end_before: Some(parse_time_arg("2000-01-01").unwrap()),
            ..TimeRange::default()
        };
        assert!(range.contains(&conv));
    }

    #[test]
    fn test_end_bounds_apply_when_resolved() {
        let mut conv = conversation("t", &["x"]);
        conv.created_at_millis = local_millis(2024, 1, 5, 12);
        conv.turns[0].end_timing_millis = local_millis(2024, 1, 6, 12);

        let after = TimeRange {
            end_after: Some(parse_time_arg("2024-01-07").unwrap()),
            ..TimeRange::default()
        };
        assert!(!after.contains(&conv));

        let before = TimeRange {
            end_before: Some(parse_time_arg("2024-01-06 11:59").unwrap()),
            ..TimeRange::default()
        };
        assert!(!before.contains(&conv));

        let within = TimeRange {
            end_after: Some(parse_time_arg("2024-01-06").unwrap()),
            end_before: Some(parse_time_arg("2024-01-06 12:00:00").unwrap()),
            ..TimeRange::default()
        };
        assert!(within.contains(&conv));
    }

    #[test]
    fn test_parse_time_formats() {
        let day = parse_time_arg("2024-01-05").unwrap();
        assert_eq!(day.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-05 00:00:00");

        let minute = parse_time_arg("2024-01-05 13:45").unwrap();
        assert_eq!(minute.format("%H:%M:%S").to_string(), "13:45:00");

        let second = parse_time_arg("2024-01-05 13:45:30").unwrap();
        assert_eq!(second.format("%H:%M:%S").to_string(), "13:45:30");
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(matches!(
            parse_time_arg("05/01/2024"),
            Err(AppError::InvalidTime { .. })
        ));
        assert!(TimeRange::from_args(Some("2024-01-01"), Some("soon"), None, None).is_err());
    }

    fn millis_to_bound(ms: i64) -> DateTime<Local> {
        crate::domain::models::millis_to_local(ms)
    }
}
