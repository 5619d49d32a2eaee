//! Output formatting for chat sessions.
//!
//! Markdown documents for export, the `ls` table, and human status lines.

use colored::Colorize;
use comfy_table::{presets::UTF8_HORIZONTAL_ONLY, Table};

use crate::domain::models::millis_to_local;
use crate::domain::{CodeBlock, Conversation, ExportDescriptor, Role, SessionSummary, Turn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const LIST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Heading used for assistant turns, after the editor's product name.
const ASSISTANT_HEADING: &str = "Cursor";

/// Renders a conversation as a Markdown document.
///
/// The output depends only on the conversation, so rendering the same
/// record twice yields identical bytes.
#[must_use]
pub fn render_markdown(conv: &Conversation) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", conv.title));

    out.push_str("## Session Info\n\n");
    out.push_str(&format!(
        "- Start Time:\t{}\n",
        conv.start_time().format(TIMESTAMP_FORMAT)
    ));
    match conv.ended_at_millis() {
        0 => {}
        ended => out.push_str(&format!(
            "- End Time:\t{}\n",
            millis_to_local(ended).format(TIMESTAMP_FORMAT)
        )),
    }
    if !conv.related_files.is_empty() {
        out.push_str(&format!(
            "- Related Files:\t{}\n",
            file_links(&conv.related_files)
        ));
    }
    out.push('\n');

    for turn in &conv.turns {
        match turn.role {
            Role::User => render_user_turn(&mut out, turn),
            Role::Assistant => render_assistant_turn(&mut out, turn),
            Role::Unknown => {
                tracing::trace!("Not rendering turn with role {}", turn.role);
            }
        }
    }

    out
}

fn render_user_turn(out: &mut String, turn: &Turn) {
    out.push_str("## User\n\n");

    if !turn.referenced_files.is_empty() {
        out.push_str(&format!(
            "Referenced Files:\t{}\n\n",
            file_links(&turn.referenced_files)
        ));
    }

    if !turn.referenced_snippets.is_empty() {
        out.push_str("Referenced Snippets:\n");
        for snippet in &turn.referenced_snippets {
            if let Some(path) = &snippet.file_path {
                out.push_str(&format!("From {}:\n", file_link(path)));
            }
            out.push_str(&snippet.text);
            out.push('\n');
        }
    }

    out.push_str(&format!("> {}\n\n", turn.text));
}

fn render_assistant_turn(out: &mut String, turn: &Turn) {
    out.push_str(&format!("## {ASSISTANT_HEADING}\n\n"));
    out.push_str(&turn.text);
    out.push_str("\n\n");

    for block in turn.code_blocks.iter().filter(|b| !b.content.is_empty()) {
        render_code_block(out, block);
    }
}

fn render_code_block(out: &mut String, block: &CodeBlock) {
    if block.file_path.is_empty() {
        out.push_str(&format!("```{}\n", block.language_tag));
    } else {
        out.push_str(&format!(
            "```{}:{}\n",
            block.language_tag,
            file_link(&block.file_path)
        ));
    }
    out.push_str(&block.content);
    out.push_str("\n```\n\n");
}

/// Renders `[basename](path)`.
fn file_link(path: &str) -> String {
    format!("[{}]({path})", basename(path))
}

fn file_links(paths: &[String]) -> String {
    paths
        .iter()
        .map(|p| file_link(p))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Last path component, accepting both `/` and `\` separators.
fn basename(path: &str) -> &str {
    let is_sep = |c: char| c == '/' || c == '\\';
    let trimmed = path.trim_end_matches(is_sep);
    trimmed.rsplit(is_sep).next().unwrap_or(trimmed)
}

/// Formats the session listing as an aligned table.
#[must_use]
pub fn format_sessions_table(sessions: &[SessionSummary]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_HORIZONTAL_ONLY);
    table.set_header(vec!["HASH", "START TIME", "END TIME", "TITLE"]);

    for session in sessions {
        let end = session.end_time.map_or_else(
            || "open".to_string(),
            |t| t.format(LIST_TIME_FORMAT).to_string(),
        );

        table.add_row(vec![
            session.id.clone(),
            session.start_time.format(LIST_TIME_FORMAT).to_string(),
            end,
            session.title.clone(),
        ]);
    }

    table.to_string()
}

/// Formats the trailing count line of the listing.
#[must_use]
pub fn format_session_count(total: usize) -> String {
    format!("Total: {} session(s)", total.to_string().cyan())
}

/// Formats one status line for a written document.
#[must_use]
pub fn format_export_line(desc: &ExportDescriptor) -> String {
    let path = desc
        .output_path
        .as_ref()
        .map_or_else(|| "-".to_string(), |p| p.display().to_string());
    format!("{} {} → {}", "✓".green(), desc.title.cyan(), path)
}

/// Formats the closing summary of an export run.
#[must_use]
pub fn format_export_summary(written: usize, failed: usize, dir: &std::path::Path) -> String {
    let mut line = format!(
        "{} Exported {} session(s) to {}/",
        "📁".bold(),
        written,
        dir.display()
    );
    if failed > 0 {
        line.push_str(&format!(" ({} failed)", failed.to_string().red()));
    }
    line
}
