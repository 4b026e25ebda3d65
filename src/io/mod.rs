pub mod export;
pub mod fetch;
pub mod loader;
pub mod output;

pub use export::export_report;
pub use fetch::{process_month_range, MonthlyRecordSource};
pub use loader::load_csv_dir;
pub use output::{create_writer, JsonWriter, OutputFormat, OutputWriter, TerminalWriter};

use crate::errors::{AnalyticsError, Result};
use std::fs;
use std::path::Path;

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    }
    Ok(())
}
