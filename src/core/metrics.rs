//! Pure metric aggregation: sums, impression-weighted means, variation and
//! share computations.
//!
//! Rounding policy, applied here so every report path agrees: clicks and
//! impressions stay integer sums, ctr rounds to 2 decimals, position to 1,
//! percentages to 2.

use std::collections::HashMap;

use crate::config::Dimension;
use crate::core::{Metric, MetricSummary, Record};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregate a record subset into one summary.
///
/// Empty input yields the all-zero summary. When total impressions is zero
/// the weighted means default to 0 instead of propagating NaN.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a Record>) -> MetricSummary {
    let mut clicks: u64 = 0;
    let mut impressions: u64 = 0;
    let mut ctr_weighted_sum = 0.0;
    let mut position_weighted_sum = 0.0;

    for record in records {
        clicks += record.clicks;
        impressions += record.impressions;
        let weight = record.impressions as f64;
        ctr_weighted_sum += record.ctr * weight;
        position_weighted_sum += record.position * weight;
    }

    let (ctr, position) = if impressions > 0 {
        let total = impressions as f64;
        (
            round2(ctr_weighted_sum / total),
            round1(position_weighted_sum / total),
        )
    } else {
        (0.0, 0.0)
    };

    MetricSummary {
        clicks,
        impressions,
        ctr,
        position,
    }
}

/// Absolute and percentage variation between two values.
///
/// The percentage is `None` when the initial value is zero: the variation
/// is undefined there, never a computed infinity.
pub fn variation(initial: u64, value_final: u64) -> (i64, Option<f64>) {
    let absolute = value_final as i64 - initial as i64;
    let percent = if initial != 0 {
        Some(round2(absolute as f64 / initial as f64 * 100.0))
    } else {
        None
    };
    (absolute, percent)
}

/// `value` as a percentage of `total`, 0 when the total is zero.
pub fn share(value: u64, total: u64) -> f64 {
    if total > 0 {
        round2(value as f64 / total as f64 * 100.0)
    } else {
        0.0
    }
}

/// One summary per distinct dimension value, preserving first-encounter
/// order so downstream rankings tie-break deterministically.
///
/// Records without a value for the dimension are skipped.
pub fn group_by_dimension<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    dimension: Dimension,
) -> Vec<(String, MetricSummary)> {
    struct Bucket {
        clicks: u64,
        impressions: u64,
        ctr_weighted_sum: f64,
        position_weighted_sum: f64,
    }

    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Bucket> = HashMap::new();

    for record in records {
        let Some(key) = record.dimension_value(dimension) else {
            continue;
        };
        let bucket = buckets.entry(key.to_string()).or_insert_with(|| {
            order.push(key.to_string());
            Bucket {
                clicks: 0,
                impressions: 0,
                ctr_weighted_sum: 0.0,
                position_weighted_sum: 0.0,
            }
        });
        bucket.clicks += record.clicks;
        bucket.impressions += record.impressions;
        let weight = record.impressions as f64;
        bucket.ctr_weighted_sum += record.ctr * weight;
        bucket.position_weighted_sum += record.position * weight;
    }

    order
        .into_iter()
        .map(|key| {
            let bucket = &buckets[&key];
            let (ctr, position) = if bucket.impressions > 0 {
                let total = bucket.impressions as f64;
                (
                    round2(bucket.ctr_weighted_sum / total),
                    round1(bucket.position_weighted_sum / total),
                )
            } else {
                (0.0, 0.0)
            };
            let summary = MetricSummary {
                clicks: bucket.clicks,
                impressions: bucket.impressions,
                ctr,
                position,
            };
            (key, summary)
        })
        .collect()
}

/// Total of one metric over a record set.
pub fn metric_total<'a>(records: impl IntoIterator<Item = &'a Record>, metric: Metric) -> u64 {
    records.into_iter().map(|r| r.metric_value(metric)).sum()
}
