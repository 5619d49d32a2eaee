//! JSON decoding for Cursor `composerData` records.
//!
//! Handles conversion from raw database values to domain models. Only the
//! fields below are mapped; anything else in the payload is ignored without
//! being type-checked, and missing or `null` fields fall back to defaults.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::domain::{AppError, CodeBlock, Conversation, Result, Role, Snippet, Turn};

/// Raw conversation record as stored in the database (JSON format).
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawChatRecord {
    #[serde(deserialize_with = "null_as_default")]
    conversation: Vec<RawMessage>,
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    context: RawContext,
    #[serde(deserialize_with = "lenient_i64")]
    created_at: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawMessage {
    #[serde(rename = "type", deserialize_with = "lenient_i64")]
    message_type: i64,
    #[serde(deserialize_with = "null_as_default")]
    text: String,
    #[serde(deserialize_with = "null_as_default")]
    context: RawContext,
    #[serde(deserialize_with = "null_as_default")]
    timing_info: RawTimingInfo,
    #[serde(deserialize_with = "null_as_default")]
    code_blocks: Vec<RawCodeBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawContext {
    #[serde(deserialize_with = "null_as_default")]
    file_selections: Vec<RawFileSelection>,
    #[serde(deserialize_with = "null_as_default")]
    selections: Vec<RawSelection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFileSelection {
    #[serde(deserialize_with = "null_as_default")]
    uri: RawUri,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSelection {
    #[serde(deserialize_with = "null_as_default")]
    text: String,
    #[serde(deserialize_with = "null_as_default")]
    uri: RawUri,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawUri {
    #[serde(deserialize_with = "null_as_default")]
    path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTimingInfo {
    #[serde(deserialize_with = "lenient_i64")]
    client_end_time: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawCodeBlock {
    #[serde(deserialize_with = "null_as_default")]
    uri: RawUri,
    #[serde(deserialize_with = "null_as_default")]
    content: String,
    #[serde(deserialize_with = "null_as_default")]
    language_id: String,
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts integer or floating-point millisecond values; floats truncate.
#[allow(clippy::cast_possible_truncation)]
fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(0);
    };

    number
        .as_i64()
        .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
        .ok_or_else(|| D::Error::custom(format!("number out of range: {number}")))
}

/// Decodes one stored record into a conversation.
///
/// The title falls back to `key` when the record has no name.
///
/// # Errors
/// Returns a `Decode` error tagged with `key` if the payload is not a JSON
/// object or a mapped field has the wrong type.
pub fn decode_record(key: &str, data: &[u8]) -> Result<Conversation> {
    let raw: RawChatRecord =
        serde_json::from_slice(data).map_err(|e| AppError::decode(key, e))?;

    let title = if raw.name.is_empty() {
        key.to_string()
    } else {
        raw.name.clone()
    };

    Ok(Conversation {
        name: raw.name,
        title,
        turns: raw.conversation.into_iter().map(into_turn).collect(),
        related_files: file_paths(raw.context.file_selections),
        created_at_millis: raw.created_at,
    })
}

fn into_turn(msg: RawMessage) -> Turn {
    let referenced_snippets = msg
        .context
        .selections
        .into_iter()
        .map(|sel| Snippet {
            file_path: Some(sel.uri.path).filter(|p| !p.is_empty()),
            text: sel.text,
        })
        .collect();

    let code_blocks = msg
        .code_blocks
        .into_iter()
        .map(|block| CodeBlock {
            language_tag: block.language_id,
            file_path: block.uri.path,
            content: block.content,
        })
        .collect();

    Turn {
        role: Role::from(msg.message_type),
        text: msg.text,
        referenced_files: file_paths(msg.context.file_selections),
        referenced_snippets,
        code_blocks,
        end_timing_millis: msg.timing_info.client_end_time,
    }
}

fn file_paths(selections: Vec<RawFileSelection>) -> Vec<String> {
    selections.into_iter().map(|s| s.uri.path).collect()
}
