use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use logpipe_forward::{timestamp_to_nanos, LogLine};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct RecordOutput<'a> {
    logger: &'a str,
    correlation: &'a str,
    level: String,
    level_value: i32,
    message: &'a str,
    args: Vec<String>,
    timestamp_ns: i64,
}

impl<'a> RecordOutput<'a> {
    fn new(line: &'a LogLine) -> Self {
        Self {
            logger: &line.logger_name,
            correlation: &line.correlation,
            level: line.log_level.to_string(),
            level_value: line.log_level.0,
            message: &line.message,
            args: line.args.iter().map(ToString::to_string).collect(),
            timestamp_ns: timestamp_to_nanos(line.timestamp),
        }
    }
}

/// Render one record in `format`, without a trailing newline.
pub fn render_log_line(line: &LogLine, format: OutputFormat) -> String {
    let out = RecordOutput::new(line);
    match format {
        OutputFormat::Json => serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TIME", "LEVEL", "LOGGER", "CORRELATION", "MESSAGE", "ARGS"])
                .add_row(vec![
                    format_timestamp(out.timestamp_ns),
                    out.level,
                    out.logger.to_string(),
                    out.correlation.to_string(),
                    out.message.to_string(),
                    out.args.join(" "),
                ]);
            table.to_string()
        }
        OutputFormat::Pretty => {
            let mut text = format!(
                "{} {:<5} [{}] {}",
                format_timestamp(out.timestamp_ns),
                out.level,
                out.logger,
                out.message
            );
            if !out.args.is_empty() {
                text.push_str(&format!(" args={}", out.args.join(",")));
            }
            if !out.correlation.is_empty() {
                text.push_str(&format!(" correlation={}", out.correlation));
            }
            text
        }
    }
}

/// Print one record to stdout. Write failures are ignored.
pub fn print_log_line(line: &LogLine, format: OutputFormat) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{}", render_log_line(line, format));
    let _ = out.flush();
}

#[derive(Serialize)]
struct CodecOutput<'a> {
    name: &'a str,
    default: bool,
}

pub fn print_codecs(names: &[&str], default: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<CodecOutput<'_>> = names
                .iter()
                .map(|&name| CodecOutput {
                    name,
                    default: name == default,
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CODEC", "DEFAULT"]);
            for name in names {
                let marker = if *name == default { "yes" } else { "" };
                table.add_row(vec![name.to_string(), marker.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for name in names {
                if *name == default {
                    println!("{name} (default)");
                } else {
                    println!("{name}");
                }
            }
        }
    }
}

/// `seconds.nanoseconds` since the Unix epoch.
fn format_timestamp(nanos: i64) -> String {
    let sign = if nanos < 0 { "-" } else { "" };
    let magnitude = nanos.unsigned_abs();
    format!(
        "{sign}{}.{:09}",
        magnitude / 1_000_000_000,
        magnitude % 1_000_000_000
    )
}
