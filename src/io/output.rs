//! Report writers.

use std::io::Write;
use std::str::FromStr;

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use crate::analysis::report::FullReport;
use crate::core::NamedTable;
use crate::errors::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

impl FromStr for OutputFormat {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "terminal" => Ok(Self::Terminal),
            other => Err(AnalyticsError::argument(format!(
                "output format '{other}' not supported, use 'json' or 'terminal'"
            ))),
        }
    }
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &FullReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &FullReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TerminalWriter;

impl Default for TerminalWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalWriter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputWriter for TerminalWriter {
    fn write_report(&mut self, report: &FullReport) -> anyhow::Result<()> {
        for table in report.tables() {
            print_table(&table);
        }
        Ok(())
    }
}

/// Render standalone tables to the terminal, outside a full report.
pub fn print_tables(tables: &[NamedTable]) {
    for table in tables {
        print_table(table);
    }
}

fn print_table(table: &NamedTable) {
    println!("{}", table.name.bold().blue());
    if table.rows.is_empty() {
        println!("  {}", "(no rows)".dimmed());
        println!();
        return;
    }
    println!("{}", render_table(table));
    println!();
}

fn render_table(table: &NamedTable) -> Table {
    let mut rendered = Table::new();
    rendered
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(table.headers.clone());
    for row in &table.rows {
        rendered.add_row(row.clone());
    }
    rendered
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new()),
    }
}
