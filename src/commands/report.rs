use std::path::PathBuf;

use anyhow::Result;

use crate::analysis::report::SearchAnalyzer;
use crate::core::Period;
use crate::io::{create_writer, export_report, load_csv_dir, OutputFormat};

pub struct ReportConfig {
    pub data_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub period_1: Period,
    pub period_2: Period,
    pub subdomains: Option<Vec<String>>,
    pub top: usize,
    pub format: OutputFormat,
    pub export: Option<PathBuf>,
    pub prefix: String,
    pub recursive: bool,
}

pub fn handle_report(config: ReportConfig) -> Result<()> {
    let client = super::resolve_client_config(config.config.as_deref())?;
    let records = load_csv_dir(&config.data_dir, &client, config.recursive)?;
    let analyzer = SearchAnalyzer::new(records, client)?;

    let report = analyzer.generate_full_report(
        &config.period_1,
        &config.period_2,
        config.subdomains.as_deref(),
        config.top,
    )?;

    if let Some(dest) = &config.export {
        export_report(&report, dest, &config.prefix)?;
    }
    create_writer(config.format).write_report(&report)?;
    Ok(())
}
