//! The comparison engine: dimension analyzers, record classification and
//! the report facade.

pub mod classifier;
pub mod page;
pub mod query;
pub mod report;
pub mod timeseries;

use std::collections::HashMap;

use crate::config::Dimension;
use crate::core::metrics::{self, share, variation};
use crate::core::{
    DistributionRow, Metric, MetricSummary, Period, Record, SubsetVariationRow, TopMoverRow,
};

/// Common capability set of the query and page analyzers.
///
/// Both analyzers own an exclusive, classified copy of the input batch;
/// every operation is a read-only pass over it.
pub trait DimensionAnalyzer {
    fn dimension(&self) -> Dimension;

    fn records(&self) -> &[Record];

    /// Per-subset comparison between two periods.
    fn compare(&self, period_1: &Period, period_2: &Period) -> Vec<SubsetVariationRow>;

    /// Top `n` items by absolute variation of `metric`, optionally
    /// restricted to pages containing any of the given host patterns.
    fn top_movers(
        &self,
        period_1: &Period,
        period_2: &Period,
        metric: Metric,
        n: usize,
        subdomain_filter: Option<&[String]>,
    ) -> Vec<TopMoverRow>;

    /// Traffic distribution over the analyzer's categorical axis, either
    /// over the whole dataset or one period of it.
    fn distribution(&self, period: Option<&Period>) -> Vec<DistributionRow>;
}

/// Records whose date falls inside the period, inclusive on both ends.
pub fn filter_by_period<'a>(records: &'a [Record], period: &Period) -> Vec<&'a Record> {
    records.iter().filter(|r| period.contains(r.date)).collect()
}

/// Keep records whose page URL contains any of the literal patterns.
/// Records without a page value drop out whenever the filter is active.
pub fn filter_by_subdomains<'a>(records: Vec<&'a Record>, patterns: &[String]) -> Vec<&'a Record> {
    records
        .into_iter()
        .filter(|r| {
            r.page
                .as_deref()
                .is_some_and(|page| patterns.iter().any(|p| page.contains(p.as_str())))
        })
        .collect()
}

/// Summarize both periods' named subsets and merge them into variation rows.
///
/// The merge is outer on subset name: a subset present in only one period
/// appears with the other side zeroed, which makes its percentage variation
/// undefined (`None`). Shares are computed against the sum of clicks across
/// the subsets passed in for that period, so overlapping subsets each count
/// against the same denominator.
pub(crate) fn compare_subsets(
    subsets_initial: Vec<(String, Vec<&Record>)>,
    subsets_final: Vec<(String, Vec<&Record>)>,
) -> Vec<SubsetVariationRow> {
    let summarized_initial: Vec<(String, MetricSummary)> = subsets_initial
        .into_iter()
        .map(|(name, records)| (name, metrics::summarize(records)))
        .collect();
    let summarized_final: Vec<(String, MetricSummary)> = subsets_final
        .into_iter()
        .map(|(name, records)| (name, metrics::summarize(records)))
        .collect();

    let clicks_total_initial: u64 = summarized_initial.iter().map(|(_, s)| s.clicks).sum();
    let clicks_total_final: u64 = summarized_final.iter().map(|(_, s)| s.clicks).sum();

    let final_by_name: HashMap<&str, &MetricSummary> = summarized_final
        .iter()
        .map(|(name, summary)| (name.as_str(), summary))
        .collect();
    let initial_names: Vec<&str> = summarized_initial
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();

    let mut merged: Vec<(String, MetricSummary, MetricSummary)> = summarized_initial
        .iter()
        .map(|(name, initial)| {
            let final_summary = final_by_name
                .get(name.as_str())
                .copied()
                .copied()
                .unwrap_or(MetricSummary::ZERO);
            (name.clone(), *initial, final_summary)
        })
        .collect();
    for (name, summary) in &summarized_final {
        if !initial_names.contains(&name.as_str()) {
            merged.push((name.clone(), MetricSummary::ZERO, *summary));
        }
    }

    merged
        .into_iter()
        .map(|(category, initial, final_summary)| {
            let share_initial = share(initial.clicks, clicks_total_initial);
            let share_final = share(final_summary.clicks, clicks_total_final);
            let (var_clicks, var_clicks_pct) = variation(initial.clicks, final_summary.clicks);
            let (var_impressions, var_impressions_pct) =
                variation(initial.impressions, final_summary.impressions);
            SubsetVariationRow {
                category,
                clicks_initial: initial.clicks,
                clicks_final: final_summary.clicks,
                impressions_initial: initial.impressions,
                impressions_final: final_summary.impressions,
                ctr_initial: initial.ctr,
                ctr_final: final_summary.ctr,
                position_initial: initial.position,
                position_final: final_summary.position,
                share_initial_pct: share_initial,
                share_final_pct: share_final,
                var_clicks,
                var_clicks_pct,
                var_impressions,
                var_impressions_pct,
                var_share_pct: metrics::round2(share_final - share_initial),
            }
        })
        .collect()
}

/// Outer-merge two per-item aggregations and rank by absolute variation.
///
/// Missing values default to zero. The sort is stable descending on
/// `variation_abs`, so ties keep first-encountered order (initial period's
/// items first, then items new in the final period).
pub(crate) fn rank_top_movers(
    items_initial: Vec<(String, u64)>,
    items_final: Vec<(String, u64)>,
    n: usize,
) -> Vec<TopMoverRow> {
    let final_by_item: HashMap<&str, u64> = items_final
        .iter()
        .map(|(item, value)| (item.as_str(), *value))
        .collect();
    let initial_items: Vec<&str> = items_initial
        .iter()
        .map(|(item, _)| item.as_str())
        .collect();

    let mut merged: Vec<(String, u64, u64)> = items_initial
        .iter()
        .map(|(item, initial)| {
            let value_final = final_by_item.get(item.as_str()).copied().unwrap_or(0);
            (item.clone(), *initial, value_final)
        })
        .collect();
    for (item, value) in &items_final {
        if !initial_items.contains(&item.as_str()) {
            merged.push((item.clone(), 0, *value));
        }
    }

    let mut rows: Vec<TopMoverRow> = merged
        .into_iter()
        .map(|(item, value_initial, value_final)| {
            let variation = value_final as i64 - value_initial as i64;
            TopMoverRow {
                item,
                group: None,
                value_initial,
                value_final,
                variation,
                variation_abs: variation.unsigned_abs(),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.variation_abs.cmp(&a.variation_abs));
    rows.truncate(n);
    rows
}

/// Per-item metric values for one period, in first-encounter order.
pub(crate) fn metric_by_item(
    records: &[&Record],
    dimension: Dimension,
    metric: Metric,
) -> Vec<(String, u64)> {
    metrics::group_by_dimension(records.iter().copied(), dimension)
        .into_iter()
        .map(|(item, summary)| {
            let value = match metric {
                Metric::Clicks => summary.clicks,
                Metric::Impressions => summary.impressions,
            };
            (item, value)
        })
        .collect()
}
