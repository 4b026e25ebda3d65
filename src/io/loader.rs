//! CSV directory loading.
//!
//! All `*.csv` files under a directory are read in sorted path order and
//! concatenated. Column names are resolved through the client configuration
//! so exports with renamed date or metric columns load without preprocessing.
//! Rows with an unparseable date are dropped and counted; a missing date or
//! metric column is a structural error and fails the whole load.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::config::ClientConfig;
use crate::core::Record;
use crate::errors::{AnalyticsError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load and concatenate every CSV file under `dir`.
///
/// A missing directory or a directory with no CSV files is an error; an
/// analysis over nothing is never what the caller meant.
pub fn load_csv_dir(dir: &Path, config: &ClientConfig, recursive: bool) -> Result<Vec<Record>> {
    if !dir.is_dir() {
        return Err(AnalyticsError::io_with_path("not a directory", dir));
    }

    let mut files = Vec::new();
    collect_csv_files(dir, recursive, &mut files)?;
    files.sort();

    if files.is_empty() {
        return Err(AnalyticsError::io_with_path("no .csv files found", dir));
    }

    let mut records = Vec::new();
    let mut dropped_total = 0u64;
    for file in &files {
        let (mut file_records, dropped) = load_csv_file(file, config)?;
        debug!(
            "loaded {} records from {}",
            file_records.len(),
            file.display()
        );
        records.append(&mut file_records);
        dropped_total += dropped;
    }

    if dropped_total > 0 {
        warn!("dropped {dropped_total} rows with unparseable dates");
    }
    info!(
        "loaded {} records from {} files under {}",
        records.len(),
        files.len(),
        dir.display()
    );
    Ok(records)
}

fn collect_csv_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| AnalyticsError::io_with_path(e.to_string(), dir))?;
    for entry in entries {
        let entry = entry.map_err(|e| AnalyticsError::io_with_path(e.to_string(), dir))?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_csv_files(&path, recursive, files)?;
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            files.push(path);
        }
    }
    Ok(())
}

struct ColumnMap {
    date: usize,
    query: Option<usize>,
    page: Option<usize>,
    clicks: usize,
    impressions: usize,
    ctr: usize,
    position: usize,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord, config: &ClientConfig, path: &Path) -> Result<Self> {
        let index_of = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            index_of(name).ok_or_else(|| {
                AnalyticsError::data_shape_with_path(format!("missing column '{name}'"), path)
            })
        };
        Ok(Self {
            date: required(&config.date_column)?,
            query: index_of("query"),
            page: index_of("page"),
            clicks: required(&config.metric_columns.clicks)?,
            impressions: required(&config.metric_columns.impressions)?,
            ctr: required(&config.metric_columns.ctr)?,
            position: required(&config.metric_columns.position)?,
        })
    }
}

/// Load one CSV file. Returns the records plus the count of rows dropped
/// for an unparseable date.
fn load_csv_file(path: &Path, config: &ClientConfig) -> Result<(Vec<Record>, u64)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(false)
        .from_path(path)
        .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;

    let headers = reader
        .headers()
        .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?
        .clone();
    let columns = ColumnMap::resolve(&headers, config, path)?;

    let mut records = Vec::new();
    let mut dropped = 0u64;
    for (row_index, row) in reader.records().enumerate() {
        // header is line 1
        let line = row_index as u64 + 2;
        let row = row.map_err(|e| AnalyticsError::parse_with_context(e.to_string(), path, line))?;

        let Some(date) = field(&row, columns.date)
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok())
        else {
            dropped += 1;
            continue;
        };

        let text_field = |index: Option<usize>| {
            index
                .and_then(|i| field(&row, i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        records.push(Record::new(
            date,
            text_field(columns.query),
            text_field(columns.page),
            parse_count(&row, columns.clicks, path, line)?,
            parse_count(&row, columns.impressions, path, line)?,
            parse_float(&row, columns.ctr, path, line)?,
            parse_float(&row, columns.position, path, line)?,
        ));
    }
    Ok((records, dropped))
}

fn field<'a>(row: &'a csv::StringRecord, index: usize) -> Option<&'a str> {
    row.get(index)
}

/// Counts exported through pandas frequently carry a float rendering
/// ("12.0"), so integers are parsed through f64.
fn parse_count(row: &csv::StringRecord, index: usize, path: &Path, line: u64) -> Result<u64> {
    let value = parse_float(row, index, path, line)?;
    if value < 0.0 {
        return Err(AnalyticsError::parse_with_context(
            format!("negative count '{value}'"),
            path,
            line,
        ));
    }
    Ok(value.round() as u64)
}

fn parse_float(row: &csv::StringRecord, index: usize, path: &Path, line: u64) -> Result<f64> {
    let raw = field(row, index).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>().map_err(|_| {
        AnalyticsError::parse_with_context(format!("invalid number '{raw}'"), path, line)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_loads_and_concatenates_sorted() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "b.csv",
            "date,query,page,clicks,impressions,ctr,position\n2026-02-01,kw2,https://e.cl/,2,20,0.1,3.0\n",
        );
        write_csv(
            dir.path(),
            "a.csv",
            "date,query,page,clicks,impressions,ctr,position\n2026-01-01,kw1,https://e.cl/,1,10,0.1,3.0\n",
        );
        let records = load_csv_dir(dir.path(), &ClientConfig::default(), false).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].query.as_deref(), Some("kw1"));
        assert_eq!(records[1].query.as_deref(), Some("kw2"));
    }

    #[test]
    fn test_bad_date_rows_are_dropped() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "a.csv",
            "date,query,clicks,impressions,ctr,position\nnot-a-date,kw,1,10,0.1,3.0\n2026-01-01,kw,2,20,0.1,3.0\n",
        );
        let records = load_csv_dir(dir.path(), &ClientConfig::default(), false).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].clicks, 2);
    }

    #[test]
    fn test_missing_metric_column_is_structural() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "a.csv", "date,query,clicks\n2026-01-01,kw,1\n");
        let err = load_csv_dir(dir.path(), &ClientConfig::default(), false).unwrap_err();
        assert!(matches!(err, AnalyticsError::DataShape { .. }));
        assert!(err.to_string().contains("impressions"));
    }

    #[test]
    fn test_missing_dimension_column_degrades_to_none() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "a.csv",
            "date,clicks,impressions,ctr,position\n2026-01-01,1,10,0.1,3.0\n",
        );
        let records = load_csv_dir(dir.path(), &ClientConfig::default(), false).unwrap();
        assert_eq!(records[0].query, None);
        assert_eq!(records[0].page, None);
    }

    #[test]
    fn test_remapped_columns() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "a.csv",
            "fecha,query,clics,impresiones,ctr,position\n2026-01-01,kw,3,30,0.1,2.5\n",
        );
        let mut config = ClientConfig::default();
        config.date_column = "fecha".to_string();
        config.metric_columns.clicks = "clics".to_string();
        config.metric_columns.impressions = "impresiones".to_string();
        let records = load_csv_dir(dir.path(), &config, false).unwrap();
        assert_eq!(records[0].clicks, 3);
        assert_eq!(records[0].impressions, 30);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_csv_dir(dir.path(), &ClientConfig::default(), false).unwrap_err();
        assert!(matches!(err, AnalyticsError::Io { .. }));
    }

    #[test]
    fn test_recursive_picks_up_subdirectories() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("2026");
        fs::create_dir(&sub).unwrap();
        write_csv(
            &sub,
            "jan.csv",
            "date,query,clicks,impressions,ctr,position\n2026-01-01,kw,1,10,0.1,3.0\n",
        );
        assert!(load_csv_dir(dir.path(), &ClientConfig::default(), false).is_err());
        let records = load_csv_dir(dir.path(), &ClientConfig::default(), true).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_float_rendered_counts_parse() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "a.csv",
            "date,query,clicks,impressions,ctr,position\n2026-01-01,kw,12.0,100.0,0.12,4.2\n",
        );
        let records = load_csv_dir(dir.path(), &ClientConfig::default(), false).unwrap();
        assert_eq!(records[0].clicks, 12);
        assert_eq!(records[0].impressions, 100);
    }
}
