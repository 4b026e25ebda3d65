//! Query-dimension analyzer.
//!
//! Subsets are taxonomy-driven: totals, branded, non-branded and one
//! `solo_<group>` subset per configured brand group. The solo subsets are
//! overlap-counting (a query matching two groups' vocabulary lands in both),
//! unlike the exclusive `matched_brand` cache.

use std::collections::HashMap;

use crate::analysis::{
    classifier, compare_subsets, filter_by_period, filter_by_subdomains, metric_by_item,
    rank_top_movers, DimensionAnalyzer,
};
use crate::config::matcher::{CompiledTaxonomy, PhraseMatcher};
use crate::config::{BrandGroup, ClientConfig, Dimension};
use crate::core::metrics::{self, share, variation};
use crate::core::{
    DistributionRow, GroupComparisonRow, Metric, Period, Record, SubsetVariationRow, TopMoverRow,
};
use crate::errors::Result;

pub struct QueryAnalyzer {
    records: Vec<Record>,
    taxonomy: CompiledTaxonomy,
}

impl QueryAnalyzer {
    /// Build an analyzer over a private copy of the batch; classification
    /// runs once here.
    pub fn new(records: Vec<Record>, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let taxonomy = CompiledTaxonomy::compile(config)?;
        let records = classifier::classify_records(records, &taxonomy);
        Ok(Self { records, taxonomy })
    }

    pub fn filter_by_period(&self, period: &Period) -> Vec<&Record> {
        filter_by_period(&self.records, period)
    }

    /// Records flagged as business-critical keywords.
    pub fn important_records(&self) -> Vec<&Record> {
        self.records.iter().filter(|r| r.is_important).collect()
    }

    /// Named subsets for one period's records.
    pub fn build_subsets<'a>(&self, records: &[&'a Record]) -> Vec<(String, Vec<&'a Record>)> {
        let mut subsets: Vec<(String, Vec<&'a Record>)> = Vec::new();
        subsets.push(("totals".to_string(), records.to_vec()));
        subsets.push((
            "branded".to_string(),
            records.iter().copied().filter(|r| r.is_brand).collect(),
        ));
        subsets.push((
            "non_branded".to_string(),
            records.iter().copied().filter(|r| !r.is_brand).collect(),
        ));
        for (name, matcher) in self.taxonomy.groups() {
            let matched = records
                .iter()
                .copied()
                .filter(|r| r.query.as_deref().is_some_and(|q| matcher.is_match(q)))
                .collect();
            subsets.push((format!("solo_{name}"), matched));
        }
        subsets
    }

    /// Per-group metric comparison between two record sets.
    ///
    /// Each group's phrase set is matched independently, so a record can
    /// count toward several groups. Shares are against the metric's grand
    /// total over the entire record set of each period.
    pub fn compare_by_groups(
        &self,
        records_initial: &[&Record],
        records_final: &[&Record],
        groups: &[BrandGroup],
        metric: Metric,
    ) -> Result<Vec<GroupComparisonRow>> {
        let total_initial = metrics::metric_total(records_initial.iter().copied(), metric);
        let total_final = metrics::metric_total(records_final.iter().copied(), metric);

        let mut rows = Vec::with_capacity(groups.len());
        for group in groups {
            let matcher = PhraseMatcher::new(&group.phrases)?;
            let sum_matching = |records: &[&Record]| -> u64 {
                records
                    .iter()
                    .filter(|r| r.query.as_deref().is_some_and(|q| matcher.is_match(q)))
                    .map(|r| r.metric_value(metric))
                    .sum()
            };
            let value_initial = sum_matching(records_initial);
            let value_final = sum_matching(records_final);

            let (variation_abs, variation_pct) = variation(value_initial, value_final);
            let share_initial = share(value_initial, total_initial);
            let share_final = share(value_final, total_final);
            rows.push(GroupComparisonRow {
                group: group.name.clone(),
                value_initial,
                value_final,
                variation: variation_abs,
                variation_pct,
                share_initial_pct: share_initial,
                share_final_pct: share_final,
                var_share_pct: metrics::round2(share_final - share_initial),
            });
        }
        Ok(rows)
    }
}

impl DimensionAnalyzer for QueryAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Query
    }

    fn records(&self) -> &[Record] {
        &self.records
    }

    fn compare(&self, period_1: &Period, period_2: &Period) -> Vec<SubsetVariationRow> {
        let records_1 = self.filter_by_period(period_1);
        let records_2 = self.filter_by_period(period_2);
        compare_subsets(self.build_subsets(&records_1), self.build_subsets(&records_2))
    }

    fn top_movers(
        &self,
        period_1: &Period,
        period_2: &Period,
        metric: Metric,
        n: usize,
        subdomain_filter: Option<&[String]>,
    ) -> Vec<TopMoverRow> {
        let mut records_1 = self.filter_by_period(period_1);
        let mut records_2 = self.filter_by_period(period_2);
        if let Some(patterns) = subdomain_filter {
            records_1 = filter_by_subdomains(records_1, patterns);
            records_2 = filter_by_subdomains(records_2, patterns);
        }

        // Brand group per query text, the final period's records first.
        let mut group_by_item: HashMap<&str, &str> = HashMap::new();
        for record in records_2.iter().chain(records_1.iter()) {
            if let (Some(query), Some(brand)) =
                (record.query.as_deref(), record.matched_brand.as_deref())
            {
                group_by_item.entry(query).or_insert(brand);
            }
        }

        let items_1 = metric_by_item(&records_1, Dimension::Query, metric);
        let items_2 = metric_by_item(&records_2, Dimension::Query, metric);
        let mut rows = rank_top_movers(items_1, items_2, n);
        for row in &mut rows {
            row.group = group_by_item.get(row.item.as_str()).map(|g| g.to_string());
        }
        rows
    }

    fn distribution(&self, period: Option<&Period>) -> Vec<DistributionRow> {
        let records: Vec<&Record> = match period {
            Some(p) => self.filter_by_period(p),
            None => self.records.iter().collect(),
        };

        let mut order: Vec<String> = Vec::new();
        let mut sums: HashMap<String, (u64, u64)> = HashMap::new();
        for record in records {
            let category = record.matched_brand.as_deref().unwrap_or("unbranded");
            let entry = sums.entry(category.to_string()).or_insert_with(|| {
                order.push(category.to_string());
                (0, 0)
            });
            entry.0 += record.clicks;
            entry.1 += record.impressions;
        }

        let total_clicks: u64 = sums.values().map(|(clicks, _)| clicks).sum();
        order.sort();
        order
            .into_iter()
            .map(|category| {
                let (clicks, impressions) = sums[&category];
                DistributionRow {
                    share_clicks_pct: share(clicks, total_clicks),
                    category,
                    clicks,
                    impressions,
                }
            })
            .collect()
    }
}
