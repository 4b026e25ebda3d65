//! Windowed month-by-month acquisition from a remote record source.
//!
//! The remote search-console client stays behind `MonthlyRecordSource`;
//! this module owns the business rules around it: the 16-month retention
//! window, per-month failure isolation, one CSV per non-empty month.

use std::path::{Path, PathBuf};

use chrono::{Months, NaiveDate};
use log::{error, info, warn};

use crate::core::Record;
use crate::errors::{AnalyticsError, Result};
use crate::io::ensure_dir;

/// Search-console data is retained for 16 months; months older than that
/// are skipped instead of fetched.
const RETENTION_MONTHS: u32 = 16;

/// One month of records from a remote property.
pub trait MonthlyRecordSource {
    fn fetch_month(&self, year: i32, month: u32) -> Result<Vec<Record>>;
}

/// Fetch each month in `month_start..=month_end` of `year` and write one
/// CSV per non-empty month to `dest` as `<year>-<month>-<property>.csv`.
///
/// Months outside the retention window are skipped with a notice. A fetch
/// failure for one month is logged and does not stop the remaining months.
/// Returns the paths written.
pub fn process_month_range(
    source: &dyn MonthlyRecordSource,
    property: &str,
    year: i32,
    month_start: u32,
    month_end: u32,
    dest: &Path,
    today: NaiveDate,
) -> Result<Vec<PathBuf>> {
    if !(1..=12).contains(&month_start) || !(1..=12).contains(&month_end) {
        return Err(AnalyticsError::argument("months must be within 1..=12"));
    }
    if month_start > month_end {
        return Err(AnalyticsError::argument(
            "start month must not be after end month",
        ));
    }
    ensure_dir(dest)?;

    let cutoff = today
        .checked_sub_months(Months::new(RETENTION_MONTHS))
        .unwrap_or(NaiveDate::MIN);

    let mut written = Vec::new();
    for month in month_start..=month_end {
        let month_date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            AnalyticsError::argument(format!("invalid month {year}-{month:02}"))
        })?;
        if month_date < cutoff {
            info!("skipping {year}-{month:02}: outside the {RETENTION_MONTHS}-month window");
            continue;
        }

        info!("fetching {year}-{month:02} for '{property}'");
        let records = match source.fetch_month(year, month) {
            Ok(records) => records,
            Err(err) => {
                error!("fetch failed for {year}-{month:02}: {err}");
                continue;
            }
        };
        if records.is_empty() {
            warn!("no data for {year}-{month:02}, skipping CSV");
            continue;
        }

        let path = dest.join(format!("{year}-{month:02}-{property}.csv"));
        write_records(&records, &path)?;
        info!("wrote {} records to {}", records.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

fn write_records(records: &[Record], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    writer
        .write_record([
            "date",
            "query",
            "page",
            "clicks",
            "impressions",
            "ctr",
            "position",
        ])
        .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    for record in records {
        writer
            .write_record([
                record.date.format("%Y-%m-%d").to_string(),
                record.query.clone().unwrap_or_default(),
                record.page.clone().unwrap_or_default(),
                record.clicks.to_string(),
                record.impressions.to_string(),
                record.ctr.to_string(),
                record.position.to_string(),
            ])
            .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    }
    writer
        .flush()
        .map_err(|e| AnalyticsError::io_with_path(e.to_string(), path))?;
    Ok(())
}
