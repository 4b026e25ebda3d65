//! Report export: one CSV per report table.

use std::path::{Path, PathBuf};

use log::info;

use crate::analysis::report::FullReport;
use crate::core::NamedTable;
use crate::errors::{AnalyticsError, Result};
use crate::io::ensure_dir;

/// Write every table of the report to `<dest>/<prefix><table>.csv`,
/// creating the destination directory. Returns the written paths.
pub fn export_report(report: &FullReport, dest: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    export_tables(&report.tables(), dest, prefix)
}

pub fn export_tables(tables: &[NamedTable], dest: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    ensure_dir(dest)?;

    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dest.join(format!("{prefix}{}.csv", table.name));
        write_table(table, &path)?;
        info!("exported {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn write_table(table: &NamedTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    writer
        .write_record(&table.headers)
        .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    }
    writer
        .flush()
        .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    Ok(())
}
