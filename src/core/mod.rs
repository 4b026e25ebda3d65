//! Core data model: records, periods, metrics and report row types.

pub mod metrics;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Dimension;
use crate::errors::{AnalyticsError, Result};

/// One row of the working dataset, in the logical schema.
///
/// The physical-to-logical column remapping happens at load time, so core
/// code never sees source column names. Classification fields are filled
/// once by the classifier when an analyzer is built and are never mutated
/// afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    /// Query text, lower-cased by the classifier. Absent when the source
    /// batch carries no query column.
    pub query: Option<String>,
    /// Page URL, original case preserved.
    pub page: Option<String>,
    pub clicks: u64,
    pub impressions: u64,
    /// Click-through rate as a fraction in [0, 1].
    pub ctr: f64,
    /// Average rank position.
    pub position: f64,

    #[serde(default)]
    pub matched_brand: Option<String>,
    #[serde(default)]
    pub is_brand: bool,
    #[serde(default)]
    pub is_important: bool,
}

impl Record {
    pub fn new(
        date: NaiveDate,
        query: Option<String>,
        page: Option<String>,
        clicks: u64,
        impressions: u64,
        ctr: f64,
        position: f64,
    ) -> Self {
        Self {
            date,
            query,
            page,
            clicks,
            impressions,
            ctr,
            position,
            matched_brand: None,
            is_brand: false,
            is_important: false,
        }
    }

    /// The text identifying this record along a dimension.
    pub fn dimension_value(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Query => self.query.as_deref(),
            Dimension::Page => self.page.as_deref(),
        }
    }

    pub fn metric_value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Clicks => self.clicks,
            Metric::Impressions => self.impressions,
        }
    }
}

/// An inclusive closed date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl FromStr for Period {
    type Err = AnalyticsError;

    /// Parses `YYYY-MM-DD..YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s.split_once("..").ok_or_else(|| {
            AnalyticsError::argument(format!(
                "period '{s}' must be formatted as YYYY-MM-DD..YYYY-MM-DD"
            ))
        })?;
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .map_err(|e| AnalyticsError::argument(format!("bad period start '{start}': {e}")))?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
            .map_err(|e| AnalyticsError::argument(format!("bad period end '{end}': {e}")))?;
        Ok(Period::new(start, end))
    }
}

/// Metrics comparable across periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Clicks,
    Impressions,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Clicks => "clicks",
            Metric::Impressions => "impressions",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "clicks" => Ok(Metric::Clicks),
            "impressions" => Ok(Metric::Impressions),
            other => Err(AnalyticsError::argument(format!(
                "metric '{other}' not supported, use 'clicks' or 'impressions'"
            ))),
        }
    }
}

/// Aggregated metrics over one record subset.
///
/// `ctr` and `position` are impression-weighted means, rounded to 2 and 1
/// decimals respectively. Empty subsets summarize to all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub position: f64,
}

impl MetricSummary {
    pub const ZERO: MetricSummary = MetricSummary {
        clicks: 0,
        impressions: 0,
        ctr: 0.0,
        position: 0.0,
    };
}

/// Per-subset comparison between two periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetVariationRow {
    pub category: String,
    pub clicks_initial: u64,
    pub clicks_final: u64,
    pub impressions_initial: u64,
    pub impressions_final: u64,
    pub ctr_initial: f64,
    pub ctr_final: f64,
    pub position_initial: f64,
    pub position_final: f64,
    /// Share of clicks against the other subsets summarized in the same
    /// call, per period.
    pub share_initial_pct: f64,
    pub share_final_pct: f64,
    pub var_clicks: i64,
    /// `None` when the initial value is zero: variation is undefined, not
    /// infinite.
    pub var_clicks_pct: Option<f64>,
    pub var_impressions: i64,
    pub var_impressions_pct: Option<f64>,
    pub var_share_pct: f64,
}

/// Per-group comparison for one metric (overlap-counting: a record matching
/// two groups counts in both).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparisonRow {
    pub group: String,
    pub value_initial: u64,
    pub value_final: u64,
    pub variation: i64,
    pub variation_pct: Option<f64>,
    /// Share against the whole period's grand total, not just matched
    /// subsets.
    pub share_initial_pct: f64,
    pub share_final_pct: f64,
    pub var_share_pct: f64,
}

/// One item (query text or page URL) among the top movers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMoverRow {
    pub item: String,
    /// Brand group for queries, hostname for pages.
    pub group: Option<String>,
    pub value_initial: u64,
    pub value_final: u64,
    pub variation: i64,
    pub variation_abs: u64,
}

/// Traffic distribution over one categorical axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow {
    pub category: String,
    pub clicks: u64,
    pub impressions: u64,
    pub share_clicks_pct: f64,
}

/// Comparison row for one caller-named subdomain pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubdomainComparisonRow {
    pub subdomain: String,
    pub clicks_initial: u64,
    pub clicks_final: u64,
    pub var_clicks: i64,
    pub var_clicks_pct: Option<f64>,
    pub impressions_initial: u64,
    pub impressions_final: u64,
    pub var_impressions: i64,
    pub var_impressions_pct: Option<f64>,
}

/// A row type renderable into a generic table.
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

fn fmt_opt_pct(value: &Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl TableRow for SubsetVariationRow {
    fn headers() -> &'static [&'static str] {
        &[
            "category",
            "clicks_initial",
            "clicks_final",
            "impressions_initial",
            "impressions_final",
            "ctr_initial",
            "ctr_final",
            "position_initial",
            "position_final",
            "share_initial_pct",
            "share_final_pct",
            "var_clicks",
            "var_clicks_pct",
            "var_impressions",
            "var_impressions_pct",
            "var_share_pct",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.category.clone(),
            self.clicks_initial.to_string(),
            self.clicks_final.to_string(),
            self.impressions_initial.to_string(),
            self.impressions_final.to_string(),
            self.ctr_initial.to_string(),
            self.ctr_final.to_string(),
            self.position_initial.to_string(),
            self.position_final.to_string(),
            self.share_initial_pct.to_string(),
            self.share_final_pct.to_string(),
            self.var_clicks.to_string(),
            fmt_opt_pct(&self.var_clicks_pct),
            self.var_impressions.to_string(),
            fmt_opt_pct(&self.var_impressions_pct),
            self.var_share_pct.to_string(),
        ]
    }
}

impl TableRow for GroupComparisonRow {
    fn headers() -> &'static [&'static str] {
        &[
            "group",
            "value_initial",
            "value_final",
            "variation",
            "variation_pct",
            "share_initial_pct",
            "share_final_pct",
            "var_share_pct",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.group.clone(),
            self.value_initial.to_string(),
            self.value_final.to_string(),
            self.variation.to_string(),
            fmt_opt_pct(&self.variation_pct),
            self.share_initial_pct.to_string(),
            self.share_final_pct.to_string(),
            self.var_share_pct.to_string(),
        ]
    }
}

impl TableRow for TopMoverRow {
    fn headers() -> &'static [&'static str] {
        &[
            "item",
            "group",
            "value_initial",
            "value_final",
            "variation",
            "variation_abs",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.item.clone(),
            self.group.clone().unwrap_or_default(),
            self.value_initial.to_string(),
            self.value_final.to_string(),
            self.variation.to_string(),
            self.variation_abs.to_string(),
        ]
    }
}

impl TableRow for DistributionRow {
    fn headers() -> &'static [&'static str] {
        &["category", "clicks", "impressions", "share_clicks_pct"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.category.clone(),
            self.clicks.to_string(),
            self.impressions.to_string(),
            self.share_clicks_pct.to_string(),
        ]
    }
}

impl TableRow for SubdomainComparisonRow {
    fn headers() -> &'static [&'static str] {
        &[
            "subdomain",
            "clicks_initial",
            "clicks_final",
            "var_clicks",
            "var_clicks_pct",
            "impressions_initial",
            "impressions_final",
            "var_impressions",
            "var_impressions_pct",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.subdomain.clone(),
            self.clicks_initial.to_string(),
            self.clicks_final.to_string(),
            self.var_clicks.to_string(),
            fmt_opt_pct(&self.var_clicks_pct),
            self.impressions_initial.to_string(),
            self.impressions_final.to_string(),
            self.var_impressions.to_string(),
            fmt_opt_pct(&self.var_impressions_pct),
        ]
    }
}

/// A named result table in generic form, ready for export or display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTable {
    pub name: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl NamedTable {
    pub fn from_rows<R: TableRow>(name: impl Into<String>, rows: &[R]) -> Self {
        Self {
            name: name.into(),
            headers: R::headers().to_vec(),
            rows: rows.iter().map(TableRow::cells).collect(),
        }
    }
}
