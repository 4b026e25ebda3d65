//! Per-keyword metric time series with period-over-period deltas.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::core::metrics::{round2, variation};
use crate::core::{Period, Record};
use crate::errors::AnalyticsError;

/// Bucket width for the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Month,
    Day,
}

impl FromStr for Periodicity {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(Self::Month),
            "day" => Ok(Self::Day),
            other => Err(AnalyticsError::argument(format!(
                "periodicity must be 'month' or 'day', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month => write!(f, "month"),
            Self::Day => write!(f, "day"),
        }
    }
}

impl Periodicity {
    /// Bucket key for a date: the month's first day, or the date itself.
    fn bucket(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Month => date.with_day(1).unwrap_or(date),
            Self::Day => date,
        }
    }

    fn next(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Month => date.checked_add_months(Months::new(1)),
            Self::Day => date.succ_opt(),
        }
    }
}

/// How the keyword argument is matched against the query field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordMatch {
    /// Exact equality, case-sensitive.
    Exact,
    /// Case-insensitive substring.
    Contains,
}

/// One time bucket of the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: NaiveDate,
    pub clicks: u64,
    pub impressions: u64,
    /// Ratio of clicks to impressions, 0 when the bucket has no impressions.
    pub ctr: f64,
    pub avg_position: f64,
    pub var_clicks: i64,
    pub var_impressions: i64,
    pub var_clicks_pct: Option<f64>,
    pub var_impressions_pct: Option<f64>,
}

impl crate::core::TableRow for SeriesPoint {
    fn headers() -> &'static [&'static str] {
        &[
            "period",
            "clicks",
            "impressions",
            "ctr",
            "avg_position",
            "var_clicks",
            "var_impressions",
            "var_clicks_pct",
            "var_impressions_pct",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let opt = |v: &Option<f64>| v.map(|p| p.to_string()).unwrap_or_default();
        vec![
            self.period.format("%Y-%m-%d").to_string(),
            self.clicks.to_string(),
            self.impressions.to_string(),
            self.ctr.to_string(),
            self.avg_position.to_string(),
            self.var_clicks.to_string(),
            self.var_impressions.to_string(),
            opt(&self.var_clicks_pct),
            opt(&self.var_impressions_pct),
        ]
    }
}

#[derive(Default)]
struct Bucket {
    clicks: u64,
    impressions: u64,
    position_sum: f64,
    rows: u64,
}

/// Bucketed metric summary for one keyword (or the whole set when `keyword`
/// is `None`), chronological, with deltas against the previous bucket.
///
/// When `fill_range` is given and the filtered set is non-empty, buckets
/// with no data inside the range are emitted as zero rows so the series has
/// no gaps.
pub fn keyword_series(
    records: &[Record],
    keyword: Option<&str>,
    matching: KeywordMatch,
    periodicity: Periodicity,
    fill_range: Option<&Period>,
) -> Vec<SeriesPoint> {
    let keyword_lower = keyword.map(str::to_lowercase);
    let matches = |record: &Record| -> bool {
        let Some(kw) = keyword else { return true };
        match &record.query {
            Some(query) => match matching {
                KeywordMatch::Exact => query == kw,
                KeywordMatch::Contains => {
                    query.to_lowercase().contains(keyword_lower.as_deref().unwrap_or(""))
                }
            },
            None => false,
        }
    };

    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    for record in records.iter().filter(|r| matches(r)) {
        let bucket = buckets.entry(periodicity.bucket(record.date)).or_default();
        bucket.clicks += record.clicks;
        bucket.impressions += record.impressions;
        bucket.position_sum += record.position;
        bucket.rows += 1;
    }

    if let Some(range) = fill_range {
        if !buckets.is_empty() {
            let mut cursor = Some(periodicity.bucket(range.start));
            while let Some(date) = cursor {
                if date > range.end {
                    break;
                }
                buckets.entry(date).or_default();
                cursor = periodicity.next(date);
            }
        }
    }

    let mut points = Vec::with_capacity(buckets.len());
    let mut previous: Option<(u64, u64)> = None;
    for (period, bucket) in buckets {
        let ctr = if bucket.impressions > 0 {
            round2(bucket.clicks as f64 / bucket.impressions as f64)
        } else {
            0.0
        };
        let avg_position = if bucket.rows > 0 {
            round2(bucket.position_sum / bucket.rows as f64)
        } else {
            0.0
        };
        let (var_clicks, var_clicks_pct, var_impressions, var_impressions_pct) =
            match previous {
                Some((prev_clicks, prev_impressions)) => {
                    let (vc, vcp) = variation(prev_clicks, bucket.clicks);
                    let (vi, vip) = variation(prev_impressions, bucket.impressions);
                    (vc, vcp, vi, vip)
                }
                None => (0, None, 0, None),
            };
        previous = Some((bucket.clicks, bucket.impressions));
        points.push(SeriesPoint {
            period,
            clicks: bucket.clicks,
            impressions: bucket.impressions,
            ctr,
            avg_position,
            var_clicks,
            var_impressions,
            var_clicks_pct,
            var_impressions_pct,
        });
    }
    points
}
