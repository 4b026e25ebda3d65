//! Page-dimension analyzer.
//!
//! Subsets are discovered from the data: totals plus one `subdomain_<host>`
//! subset per distinct hostname. URLs that do not parse yield no hostname
//! and drop out of hostname-keyed subsets and distributions only; they stay
//! in totals.

use std::collections::HashMap;

use url::Url;

use crate::analysis::{
    compare_subsets, filter_by_period, filter_by_subdomains, metric_by_item, rank_top_movers,
    DimensionAnalyzer,
};
use crate::config::Dimension;
use crate::core::metrics::{self, share, variation};
use crate::core::{
    DistributionRow, Metric, Period, Record, SubdomainComparisonRow, SubsetVariationRow,
    TopMoverRow,
};

/// Hostname of a URL, `None` when it cannot be determined.
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Path component of a URL, empty when it cannot be determined.
pub fn url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| u.path().to_string())
        .unwrap_or_default()
}

pub struct PageAnalyzer {
    records: Vec<Record>,
}

impl PageAnalyzer {
    /// Build an analyzer over a private copy of the batch. Page URLs keep
    /// their original case; no brand classification applies here.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn filter_by_period(&self, period: &Period) -> Vec<&Record> {
        filter_by_period(&self.records, period)
    }

    /// Named subsets for one period's records: totals plus one subset per
    /// distinct hostname, in first-encounter order.
    pub fn build_subsets<'a>(&self, records: &[&'a Record]) -> Vec<(String, Vec<&'a Record>)> {
        let mut subsets: Vec<(String, Vec<&'a Record>)> = Vec::new();
        subsets.push(("totals".to_string(), records.to_vec()));

        let mut order: Vec<String> = Vec::new();
        let mut by_host: HashMap<String, Vec<&'a Record>> = HashMap::new();
        for record in records {
            let Some(host) = record.page.as_deref().and_then(hostname) else {
                continue;
            };
            by_host
                .entry(host.clone())
                .or_insert_with(|| {
                    order.push(host);
                    Vec::new()
                })
                .push(record);
        }
        for host in order {
            let matched = by_host.remove(&host).unwrap_or_default();
            subsets.push((format!("subdomain_{host}"), matched));
        }
        subsets
    }

    /// Clicks/impressions comparison for caller-named host patterns.
    ///
    /// Patterns are literal substrings over the page URL. A pattern with no
    /// records in either period produces no row; one empty side defaults to
    /// zero, leaving the percentage undefined.
    pub fn compare_subdomains(
        &self,
        period_1: &Period,
        period_2: &Period,
        patterns: &[String],
    ) -> Vec<SubdomainComparisonRow> {
        let records_1 = self.filter_by_period(period_1);
        let records_2 = self.filter_by_period(period_2);

        let mut rows = Vec::new();
        for pattern in patterns {
            let single = std::slice::from_ref(pattern);
            let matched_1 = filter_by_subdomains(records_1.clone(), single);
            let matched_2 = filter_by_subdomains(records_2.clone(), single);
            if matched_1.is_empty() && matched_2.is_empty() {
                continue;
            }
            let initial = metrics::summarize(matched_1);
            let final_summary = metrics::summarize(matched_2);
            let (var_clicks, var_clicks_pct) = variation(initial.clicks, final_summary.clicks);
            let (var_impressions, var_impressions_pct) =
                variation(initial.impressions, final_summary.impressions);
            rows.push(SubdomainComparisonRow {
                subdomain: pattern.clone(),
                clicks_initial: initial.clicks,
                clicks_final: final_summary.clicks,
                var_clicks,
                var_clicks_pct,
                impressions_initial: initial.impressions,
                impressions_final: final_summary.impressions,
                var_impressions,
                var_impressions_pct,
            });
        }
        rows
    }
}

impl DimensionAnalyzer for PageAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Page
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

        let items_1 = metric_by_item(&records_1, Dimension::Page, metric);
        let items_2 = metric_by_item(&records_2, Dimension::Page, metric);
        let mut rows = rank_top_movers(items_1, items_2, n);
        for row in &mut rows {
            row.group = hostname(&row.item);
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
            let Some(host) = record.page.as_deref().and_then(hostname) else {
                continue;
            };
            let entry = sums.entry(host.clone()).or_insert_with(|| {
                order.push(host);
                (0, 0)
            });
            entry.0 += record.clicks;
            entry.1 += record.impressions;
        }

        let total_clicks: u64 = sums.values().map(|(clicks, _)| clicks).sum();
        let mut rows: Vec<DistributionRow> = order
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
            .collect();
        rows.sort_by(|a, b| b.clicks.cmp(&a.clicks));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record_on(day: u32, page: &str, clicks: u64) -> Record {
        Record::new(
            NaiveDate::from_ymd_opt(2026, 4, day).unwrap(),
            None,
            Some(page.to_string()),
            clicks,
            clicks * 10,
            0.1,
            2.0,
        )
    }

    fn period(start_day: u32, end_day: u32) -> Period {
        Period::new(
            NaiveDate::from_ymd_opt(2026, 4, start_day).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, end_day).unwrap(),
        )
    }

    #[test]
    fn test_hostname_extraction() {
        assert_eq!(
            hostname("https://tienda.example.cl/path"),
            Some("tienda.example.cl".to_string())
        );
        assert_eq!(hostname("not a url"), None);
        assert_eq!(url_path("https://tienda.example.cl/pos/venta"), "/pos/venta");
        assert_eq!(url_path("::broken::"), "");
    }

    #[test]
    fn test_subsets_keep_malformed_urls_in_totals() {
        let analyzer = PageAnalyzer::new(vec![
            record_on(1, "https://www.example.cl/a", 10),
            record_on(1, "https://tienda.example.cl/b", 5),
            record_on(1, "malformed", 3),
        ]);
        let all: Vec<&Record> = analyzer.records().iter().collect();
        let subsets = analyzer.build_subsets(&all);
        let names: Vec<&str> = subsets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "totals",
                "subdomain_www.example.cl",
                "subdomain_tienda.example.cl"
            ]
        );
        assert_eq!(subsets[0].1.len(), 3);
        assert_eq!(subsets[1].1.len(), 1);
    }

    #[test]
    fn test_compare_discovers_new_subdomain() {
        let analyzer = PageAnalyzer::new(vec![
            record_on(1, "https://www.example.cl/a", 10),
            record_on(10, "https://www.example.cl/a", 12),
            record_on(10, "https://tienda.example.cl/b", 7),
        ]);
        let rows = analyzer.compare(&period(1, 7), &period(8, 14));
        let tienda = rows
            .iter()
            .find(|r| r.category == "subdomain_tienda.example.cl")
            .unwrap();
        assert_eq!(tienda.clicks_initial, 0);
        assert_eq!(tienda.clicks_final, 7);
        assert_eq!(tienda.var_clicks_pct, None);
    }

    #[test]
    fn test_top_movers_group_is_hostname() {
        let analyzer = PageAnalyzer::new(vec![
            record_on(1, "https://www.example.cl/a", 100),
            record_on(10, "https://www.example.cl/a", 40),
            record_on(10, "https://tienda.example.cl/b", 20),
        ]);
        let rows = analyzer.top_movers(&period(1, 7), &period(8, 14), Metric::Clicks, 10, None);
        assert_eq!(rows[0].item, "https://www.example.cl/a");
        assert_eq!(rows[0].group.as_deref(), Some("www.example.cl"));
        assert_eq!(rows[0].variation, -60);
        assert_eq!(rows[1].variation_abs, 20);
    }

    #[test]
    fn test_distribution_excludes_unparseable_sorted_by_clicks() {
        let analyzer = PageAnalyzer::new(vec![
            record_on(1, "https://www.example.cl/a", 10),
            record_on(1, "https://tienda.example.cl/b", 40),
            record_on(1, "malformed", 99),
        ]);
        let rows = analyzer.distribution(None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "tienda.example.cl");
        assert_eq!(rows[0].clicks, 40);
        assert_eq!(rows[0].share_clicks_pct, 80.0);
        assert_eq!(rows[1].category, "www.example.cl");
    }

    #[test]
    fn test_compare_subdomains_skips_absent_patterns() {
        let analyzer = PageAnalyzer::new(vec![
            record_on(1, "https://www.example.cl/a", 10),
            record_on(10, "https://www.example.cl/a", 25),
        ]);
        let patterns = vec!["www.example.cl".to_string(), "blog.example.cl".to_string()];
        let rows = analyzer.compare_subdomains(&period(1, 7), &period(8, 14), &patterns);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subdomain, "www.example.cl");
        assert_eq!(rows[0].var_clicks, 15);
        assert_eq!(rows[0].var_clicks_pct, Some(150.0));
    }
}
