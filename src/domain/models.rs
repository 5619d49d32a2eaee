//! Domain models for Cursor chat sessions.
//!
//! These models represent one decoded `composerData:` record from Cursor's
//! `cursorDiskKV` table plus the projections used for listing and export.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Key prefix of conversation records in Cursor's KV store.
pub const COMPOSER_KEY_PREFIX: &str = "composerData:";

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    /// Message from the user (human).
    User,
    /// Message from the AI assistant.
    Assistant,
    /// Any other stored type value.
    Unknown,
}

impl From<i64> for Role {
    fn from(value: i64) -> Self {
        match value {
            1 => Self::User,
            2 => Self::Assistant,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Assistant => write!(f, "Assistant"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Code or text quoted by the user, optionally tied to a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
    pub file_path: Option<String>,
    pub text: String,
}

/// Code block attached to an assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    /// Fence info string, may be empty.
    pub language_tag: String,
    /// File the block targets, may be empty.
    pub file_path: String,
    pub content: String,
}

/// A single message in a conversation.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Files the author attached to this turn.
    pub referenced_files: Vec<String>,
    /// Inline quotes the author attached to this turn.
    pub referenced_snippets: Vec<Snippet>,
    pub code_blocks: Vec<CodeBlock>,
    /// When generation/interaction for this turn ended; 0 if unknown.
    pub end_timing_millis: i64,
}

impl Default for Turn {
    fn default() -> Self {
        Self {
            role: Role::Unknown,
            text: String::new(),
            referenced_files: Vec::new(),
            referenced_snippets: Vec::new(),
            code_blocks: Vec::new(),
            end_timing_millis: 0,
        }
    }
}

/// One decoded chat session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    /// Name exactly as stored; empty for untitled records.
    pub name: String,
    /// Stored name, or the store key when the record has none.
    pub title: String,
    /// Turns in stored (chronological) order.
    pub turns: Vec<Turn>,
    /// Files attached at the conversation level.
    pub related_files: Vec<String>,
    /// Creation time in epoch milliseconds; 0 if unknown.
    pub created_at_millis: i64,
}

impl Conversation {
    /// End time in epoch milliseconds, taken from the last turn.
    ///
    /// Returns 0 when there are no turns or the last turn is still open.
    #[must_use]
    pub fn ended_at_millis(&self) -> i64 {
        self.turns.last().map_or(0, |t| t.end_timing_millis)
    }

    /// Start time as local wall-clock time, truncated to seconds.
    #[must_use]
    pub fn start_time(&self) -> DateTime<Local> {
        millis_to_local(self.created_at_millis)
    }

    /// End time as local wall-clock time, if resolved.
    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Local>> {
        match self.ended_at_millis() {
            0 => None,
            ms => Some(millis_to_local(ms)),
        }
    }

    /// Whether at least one turn carries written text.
    #[must_use]
    pub fn has_written_content(&self) -> bool {
        self.turns.iter().any(|t| !t.text.is_empty())
    }
}

/// Converts epoch milliseconds to local time at second granularity.
#[must_use]
pub fn millis_to_local(millis: i64) -> DateTime<Local> {
    DateTime::from_timestamp(millis / 1000, 0)
        .unwrap_or_default()
        .with_timezone(&Local)
}

/// Strips the record-type prefix from a store key.
#[must_use]
pub fn session_id_from_key(key: &str) -> &str {
    key.strip_prefix(COMPOSER_KEY_PREFIX).unwrap_or(key)
}

/// Rebuilds the store key for a session identifier.
#[must_use]
pub fn key_for_session(id: &str) -> String {
    format!("{COMPOSER_KEY_PREFIX}{id}")
}

/// Lightweight projection of a session used for listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Local>,
    /// `None` while the session is unresolved/open.
    pub end_time: Option<DateTime<Local>>,
}

impl SessionSummary {
    /// Builds a summary for a conversation stored under `key`.
    #[must_use]
    pub fn new(key: &str, conv: &Conversation) -> Self {
        Self {
            id: session_id_from_key(key).to_string(),
            title: conv.name.clone(),
            start_time: conv.start_time(),
            end_time: conv.end_time(),
        }
    }
}

/// A session selected for export and, once written, where it went.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDescriptor {
    pub id: String,
    pub title: String,
    /// Filled in only after a successful write.
    pub output_path: Option<PathBuf>,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    /// Full store key, used to re-fetch the payload.
    #[serde(skip)]
    pub key: String,
}

impl ExportDescriptor {
    /// Builds a descriptor for a conversation stored under `key`.
    #[must_use]
    pub fn new(key: &str, conv: &Conversation) -> Self {
        Self {
            id: session_id_from_key(key).to_string(),
            title: conv.title.clone(),
            output_path: None,
            start_time: conv.start_time(),
            end_time: conv.end_time(),
            key: key.to_string(),
        }
    }
}

/// Counters collected while scanning the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogStats {
    /// Rows read from the store.
    pub rows_scanned: usize,
    /// Rows skipped before decode (sentinel values).
    pub sentinel_skipped: usize,
    /// Rows whose payload failed to decode.
    pub decode_failures: usize,
    /// Decoded records that are not user-visible conversations.
    pub invalid: usize,
    /// Conversations outside the requested time range.
    pub out_of_range: usize,
    /// Conversations accepted into the catalog.
    pub accepted: usize,
}
