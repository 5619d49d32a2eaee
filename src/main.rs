//! Cursor Markdown Export - list and export chat history from Cursor IDE.
//!
//! Reads the `cursorDiskKV` table of Cursor's global `state.vscdb`, decodes
//! each stored conversation and writes it out as a Markdown document.
//!
//!   cursor-md-export ls                                  # List sessions
//!   cursor-md-export export <id>                         # Export one session
//!   cursor-md-export export --start-after 2024-01-01     # Batch export

mod application;
mod cli;
mod domain;
mod infrastructure;

use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    export_all, export_session, format_export_line, format_export_summary, format_session_count,
    format_sessions_table, list_sessions, ExportOptions, ExportReport, ListReport, NamingPolicy,
    SortOrder,
};
use cli::{Cli, Commands};
use domain::{AppConfig, AppError, TimeRange};
use infrastructure::{load_config, resolve_db_path, StateDbReader};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        if cli.command.json() {
            report_failure(&cli.command, &e);
        } else {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: &Cli) -> domain::Result<()> {
    match &cli.command {
        Commands::Ls { db, json } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_ls(db.as_deref(), *json, &config)
        }
        Commands::Export {
            id,
            db,
            out,
            json,
            sort_desc,
            byname,
            start_after,
            start_before,
            end_after,
            end_before,
        } => {
            // Time arguments are validated before anything touches the store
            let time_range = TimeRange::from_args(
                start_after.as_deref(),
                start_before.as_deref(),
                end_after.as_deref(),
                end_before.as_deref(),
            )?;
            let config = load_config(cli.config.as_deref())?;

            let naming = if *byname || config.export.by_name {
                NamingPolicy::ByTitle
            } else {
                NamingPolicy::BySequence
            };
            let options = ExportOptions {
                output_dir: out
                    .clone()
                    .unwrap_or_else(|| config.export.output_dir.clone()),
                time_range,
                order: SortOrder::from_desc(sort_desc.unwrap_or(config.export.sort_desc)),
                naming,
            };

            cmd_export(id.as_deref(), db.as_deref(), *json, &options, &config)
        }
        Commands::Version { json } => cmd_version(*json),
    }
}

/// List sessions command.
fn cmd_ls(db: Option<&std::path::Path>, json: bool, config: &AppConfig) -> domain::Result<()> {
    let db_path = resolve_db_path(db, config.store.db_path.as_deref())?;
    let reader = StateDbReader::open(&db_path)?;
    let (sessions, _) = list_sessions(&reader)?;

    if json {
        return print_json(&ListReport::completed(sessions));
    }

    if sessions.is_empty() {
        println!("No sessions found in {}", db_path.display());
        return Ok(());
    }

    println!("{}", format_sessions_table(&sessions));
    println!();
    println!("{}", format_session_count(sessions.len()));

    Ok(())
}

/// Export one session by ID, or all sessions in the time range.
fn cmd_export(
    id: Option<&str>,
    db: Option<&std::path::Path>,
    json: bool,
    options: &ExportOptions,
    config: &AppConfig,
) -> domain::Result<()> {
    let db_path = resolve_db_path(db, config.store.db_path.as_deref())?;
    let reader = StateDbReader::open(&db_path)?;

    let report = match id {
        Some(id) => {
            if !options.time_range.is_empty() {
                tracing::debug!("Time filters are ignored when exporting a single session");
            }
            export_session(&reader, id, options)?
        }
        None => export_all(&reader, options)?,
    };

    if json {
        return print_json(&report);
    }

    for desc in &report.sessions {
        println!("{}", format_export_line(desc));
    }
    println!();
    println!(
        "{}",
        format_export_summary(report.total, report.failed, &options.output_dir)
    );

    Ok(())
}

#[derive(Serialize)]
struct VersionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'static str>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl VersionReport {
    fn failure(err: &AppError) -> Self {
        Self {
            version: None,
            success: false,
            error: Some(err.to_string()),
        }
    }
}

/// Show version command.
fn cmd_version(json: bool) -> domain::Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    if json {
        return print_json(&VersionReport {
            version: Some(version),
            success: true,
            error: None,
        });
    }

    println!("cursor-md-export v{version}");
    Ok(())
}

fn print_json<T: Serialize>(report: &T) -> domain::Result<()> {
    let rendered = serde_json::to_string_pretty(report).map_err(AppError::json_parse)?;
    println!("{rendered}");
    Ok(())
}

/// Builds the JSON report a command emits when it fails as a whole.
fn failure_report(command: &Commands, err: &AppError) -> serde_json::Result<serde_json::Value> {
    match command {
        Commands::Ls { .. } => serde_json::to_value(ListReport::failure(err)),
        Commands::Export { .. } => serde_json::to_value(ExportReport::failure(err)),
        Commands::Version { .. } => serde_json::to_value(VersionReport::failure(err)),
    }
}

/// Prints a fatal error as the command's JSON report.
fn report_failure(command: &Commands, err: &AppError) {
    let printed = failure_report(command, err)
        .map_err(AppError::json_parse)
        .and_then(|report| print_json(&report));

    if let Err(e) = printed {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
